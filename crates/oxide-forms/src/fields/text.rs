//! Text-like field kinds.
//!
//! Every kind here holds strings; the kind only changes how the field is
//! presented.

use super::{FieldConfig, InputKind};

macro_rules! string_kinds {
    ($($(#[$doc:meta])* $name:ident => $kind:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name() -> FieldConfig<String> {
                FieldConfig::new(InputKind::$kind)
            }
        )*
    };
}

string_kinds! {
    /// A push button.
    button => Button;
    /// A color picker.
    color => Color;
    /// A date input.
    date => Date;
    /// A local date and time input.
    datetime_local => DatetimeLocal;
    /// An email input.
    email => Email;
    /// An image submit button.
    image => Image;
    /// A month input.
    month => Month;
    /// A password input.
    password => Password;
    /// A radio button.
    radio => Radio;
    /// A reset button.
    reset => Reset;
    /// A search input.
    search => Search;
    /// A submit button.
    submit => Submit;
    /// A telephone number input.
    tel => Tel;
    /// A single-line text input.
    text => Text;
    /// A time input.
    time => Time;
    /// A URL input.
    url => Url;
    /// A week input.
    week => Week;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSpec;
    use crate::value::{DataType, Value};
    use crate::Validator;

    #[test]
    fn test_text_kinds_hold_strings() {
        for config in [text(), email(), password(), url(), datetime_local()] {
            let field = FieldSpec::new("f").with(config, []);
            assert_eq!(field.data_type(), DataType::String);
        }
    }

    #[test]
    fn test_email_field() {
        let field = FieldSpec::new("email")
            .with(email().value("user@example.com"), [Validator::email()]);
        assert_eq!(field.kind(), InputKind::Email);
        assert_eq!(field.value(), &Value::String("user@example.com".to_string()));
    }

    #[test]
    fn test_password_field() {
        let field = FieldSpec::new("password")
            .with(password(), [Validator::required(), Validator::min(8)]);
        assert!(field.is_required());
        assert_eq!(field.validators().len(), 2);
    }
}
