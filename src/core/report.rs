use crate::domain::model::{Address, ValidationResult};

pub const REPORT_FILE_NAME: &str = "validation-results.txt";

fn join(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 產生下載用的結果文字檔內容
pub fn format_report(result: &ValidationResult) -> String {
    format!(
        "Valid Emails:\n{}\n\nInvalid Emails:\n{}",
        join(&result.valid),
        join(&result.invalid)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(items: &[&str]) -> Vec<Address> {
        items.iter().filter_map(|s| Address::parse(s)).collect()
    }

    #[test]
    fn test_report_layout() {
        let result = ValidationResult {
            valid: addrs(&["user@example.com", "a@b.c"]),
            invalid: addrs(&["not-an-email"]),
        };
        assert_eq!(
            format_report(&result),
            "Valid Emails:\nuser@example.com\na@b.c\n\nInvalid Emails:\nnot-an-email"
        );
    }

    #[test]
    fn test_report_with_empty_section() {
        let result = ValidationResult {
            valid: vec![],
            invalid: addrs(&["nope"]),
        };
        assert_eq!(format_report(&result), "Valid Emails:\n\n\nInvalid Emails:\nnope");
    }
}
