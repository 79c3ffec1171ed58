use lazy_static::lazy_static;
use regex::Regex;

pub const INTERESTS: [&str; 6] = [
    "Market Analysis",
    "Trading Strategies",
    "Investment Opportunities",
    "Risk Management",
    "Tech Insights",
    "Regulatory Updates",
];

/// Newsletter signup request. Validated only, nothing is sent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SignupForm {
    pub email: String,
    pub interests: Vec<String>,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_email(&self.email) {
            return Err("Please enter a valid email address".to_string());
        }

        if let Some(unknown) = self.interests.iter().find(|i| !INTERESTS.contains(&i.as_str())) {
            return Err(format!("Unknown interest: {}", unknown));
        }

        Ok(())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    }

    EMAIL_REGEX.is_match(email)
}
