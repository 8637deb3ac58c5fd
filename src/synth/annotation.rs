use crate::decl::Annotation;
use crate::schema::FieldType;

/// Where an annotation ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationForm {
    /// Inside a class body: optionality applies, references are deferred.
    Field,
    /// Right-hand side of a type alias: the type itself, never optional.
    Alias,
}

/// Wrapping order is fixed, innermost first: base → literal → list → optional.
pub fn annotate(ty: &FieldType, form: AnnotationForm) -> Annotation {
    let mut annotation = match form {
        AnnotationForm::Alias => Annotation::Name(ty.code.clone()),
        AnnotationForm::Field => Annotation::ForwardRef(ty.code.clone()),
    };

    if ty.is_literal {
        annotation = Annotation::Literal(ty.code.clone());
    }

    if ty.is_array {
        annotation = Annotation::List(Box::new(annotation));
    }

    if form == AnnotationForm::Field && !ty.required {
        annotation = Annotation::Optional(Box::new(annotation));
    }

    annotation
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fwd(s: &str) -> Annotation { Annotation::ForwardRef(s.into()) }

    #[test]
    fn required_scalar_is_bare_forward_ref() {
        let ty = FieldType::new("string", true, false);
        assert_eq!(annotate(&ty, AnnotationForm::Field), fwd("string"));
        assert_eq!(annotate(&ty, AnnotationForm::Alias), Annotation::Name("string".into()));
    }

    #[test]
    fn optional_list_wraps_list_first() {
        let ty = FieldType::new("HumanName", false, true);
        assert_eq!(
            annotate(&ty, AnnotationForm::Field),
            Annotation::Optional(Box::new(Annotation::List(Box::new(fwd("HumanName")))))
        );
    }

    #[test]
    fn literal_carries_exact_value() {
        let ty = FieldType::literal("Patient");
        assert_eq!(annotate(&ty, AnnotationForm::Field), Annotation::Literal("Patient".into()));
    }

    proptest! {
        #[test]
        fn optional_only_in_field_form(
            code in "[a-zA-Z]{1,12}",
            required in any::<bool>(),
            is_array in any::<bool>(),
            is_literal in any::<bool>(),
        ) {
            let ty = FieldType { is_literal, ..FieldType::new(code, required, is_array) };
            prop_assert_eq!(annotate(&ty, AnnotationForm::Field).is_optional(), !required);
            prop_assert!(!annotate(&ty, AnnotationForm::Alias).is_optional());
        }
    }
}
