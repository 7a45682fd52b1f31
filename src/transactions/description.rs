//! Builds the description of a new transaction from its type and the type's
//! extra fields.

use serde::Deserialize;

/// What a transaction is for. Every type but [TransactionKind::Custom]
/// derives its description from the other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Free text.
    #[default]
    Custom,
    /// A beverage report.
    Drinks,
    /// Money credited to the member.
    Credit,
    /// A fine decided in a meeting.
    Fine,
    /// A paid out reimbursement request.
    Reimbursement,
}

impl TransactionKind {
    /// Every type in the order they are offered.
    pub const ALL: [TransactionKind; 5] = [
        TransactionKind::Custom,
        TransactionKind::Drinks,
        TransactionKind::Credit,
        TransactionKind::Fine,
        TransactionKind::Reimbursement,
    ];

    /// The form value, e.g. "drinks".
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Custom => "custom",
            TransactionKind::Drinks => "drinks",
            TransactionKind::Credit => "credit",
            TransactionKind::Fine => "fine",
            TransactionKind::Reimbursement => "reimbursement",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Custom => "Eigene Beschreibung",
            TransactionKind::Drinks => "Getränkeabrechnung",
            TransactionKind::Credit => "Gutschrift",
            TransactionKind::Fine => "Strafe",
            TransactionKind::Reimbursement => "Rückerstattung",
        }
    }

    /// Whether the user types the description themselves.
    pub fn is_editable(self) -> bool {
        self == TransactionKind::Custom
    }
}

/// The meetings a fine can be decided in.
pub const PROTOCOL_TYPES: [&str; 4] = ["AC", "CC", "GCC", "FCC"];

/// The semesters a fine can be decided in.
pub const SEMESTERS: [&str; 2] = ["WiSe", "SoSe"];

/// The fields of the add transaction form that feed into the description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DescriptionInputs {
    #[serde(default)]
    pub kind: TransactionKind,
    /// The typed description, only used for [TransactionKind::Custom].
    #[serde(default)]
    pub description: String,
    /// The transaction's date, "dd.mm.yyyy".
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub drinks_report_date: String,
    #[serde(default)]
    pub protocol_number: String,
    #[serde(default)]
    pub protocol_type: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub refund_request_date: String,
}

impl DescriptionInputs {
    /// The label of the first extra field the selected type needs that is
    /// still empty.
    ///
    /// [build_description] fills such fields with placeholders, which must
    /// not end up in a booked transaction.
    pub fn missing_field(&self) -> Option<&'static str> {
        let required = match self.kind {
            TransactionKind::Custom | TransactionKind::Credit => vec![],
            TransactionKind::Drinks => vec![(&self.drinks_report_date, "das Datum der Abrechnung")],
            TransactionKind::Fine => vec![
                (&self.protocol_number, "die Protokollnummer"),
                (&self.protocol_type, "die Sitzung"),
                (&self.semester, "das Semester"),
            ],
            TransactionKind::Reimbursement => {
                vec![(&self.refund_request_date, "das Datum des Antrags")]
            }
        };

        required
            .into_iter()
            .find(|(value, _)| value.trim().is_empty())
            .map(|(_, label)| label)
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let value = value.trim();

    if value.is_empty() { placeholder } else { value }
}

/// The description for `inputs`, with placeholders for missing fields.
pub fn build_description(inputs: &DescriptionInputs) -> String {
    let date = or_placeholder(&inputs.date, "Datum");

    match inputs.kind {
        TransactionKind::Custom => inputs.description.trim().to_owned(),
        TransactionKind::Drinks => match inputs.drinks_report_date.trim() {
            "" => "Getränkeabrechnung von {date}".to_owned(),
            report_date => format!("Getränkeabrechnung vom {report_date}"),
        },
        TransactionKind::Credit => format!("Gutschrift vom {date}"),
        TransactionKind::Fine => format!(
            "Strafe ({}. {} {}) vom {date}",
            or_placeholder(&inputs.protocol_number, "..."),
            or_placeholder(&inputs.protocol_type, "..."),
            or_placeholder(&inputs.semester, "..."),
        ),
        TransactionKind::Reimbursement => match inputs.refund_request_date.trim() {
            "" => "Rückerstattung (AaA von {date})".to_owned(),
            request_date => format!("Rückerstattung (AaA von {request_date})"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{DescriptionInputs, TransactionKind, build_description};

    fn inputs(kind: TransactionKind) -> DescriptionInputs {
        DescriptionInputs {
            kind,
            ..Default::default()
        }
    }

    #[test]
    fn custom_uses_typed_text() {
        let inputs = DescriptionInputs {
            description: " Spende ".to_owned(),
            ..inputs(TransactionKind::Custom)
        };

        assert_eq!(build_description(&inputs), "Spende");
    }

    #[test]
    fn missing_fields_show_placeholders() {
        assert_eq!(
            build_description(&inputs(TransactionKind::Drinks)),
            "Getränkeabrechnung von {date}"
        );
        assert_eq!(build_description(&inputs(TransactionKind::Credit)), "Gutschrift vom Datum");
        assert_eq!(
            build_description(&inputs(TransactionKind::Fine)),
            "Strafe (.... ... ...) vom Datum"
        );
        assert_eq!(
            build_description(&inputs(TransactionKind::Reimbursement)),
            "Rückerstattung (AaA von {date})"
        );
    }

    #[test]
    fn fine_combines_protocol_and_date() {
        let inputs = DescriptionInputs {
            date: "03.11.2024".to_owned(),
            protocol_number: "4".to_owned(),
            protocol_type: "GCC".to_owned(),
            semester: "WiSe".to_owned(),
            ..inputs(TransactionKind::Fine)
        };

        assert_eq!(build_description(&inputs), "Strafe (4. GCC WiSe) vom 03.11.2024");
    }

    #[test]
    fn dated_types_use_their_own_date() {
        let drinks = DescriptionInputs {
            date: "01.01.2025".to_owned(),
            drinks_report_date: "15.12.2024".to_owned(),
            ..inputs(TransactionKind::Drinks)
        };
        let refund = DescriptionInputs {
            refund_request_date: "02.12.2024".to_owned(),
            ..inputs(TransactionKind::Reimbursement)
        };

        assert_eq!(build_description(&drinks), "Getränkeabrechnung vom 15.12.2024");
        assert_eq!(build_description(&refund), "Rückerstattung (AaA von 02.12.2024)");
    }

    #[test]
    fn generated_types_report_their_first_empty_field() {
        assert_eq!(
            inputs(TransactionKind::Drinks).missing_field(),
            Some("das Datum der Abrechnung")
        );
        assert_eq!(
            inputs(TransactionKind::Reimbursement).missing_field(),
            Some("das Datum des Antrags")
        );

        let fine = DescriptionInputs {
            protocol_number: "3".to_owned(),
            protocol_type: "CC".to_owned(),
            ..inputs(TransactionKind::Fine)
        };
        assert_eq!(fine.missing_field(), Some("das Semester"));

        let fine = DescriptionInputs {
            semester: "WiSe".to_owned(),
            ..fine
        };
        assert_eq!(fine.missing_field(), None);
        assert_eq!(inputs(TransactionKind::Credit).missing_field(), None);
        assert_eq!(inputs(TransactionKind::Custom).missing_field(), None);
    }

    #[test]
    fn kinds_parse_from_form_values() {
        let inputs: DescriptionInputs =
            serde_urlencoded::from_str("kind=credit&date=05.01.2025").unwrap();

        assert_eq!(inputs.kind, TransactionKind::Credit);
        assert_eq!(build_description(&inputs), "Gutschrift vom 05.01.2025");
    }
}
