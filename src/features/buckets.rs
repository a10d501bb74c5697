//! Threshold bucket rules, one function per measurement. Rules are evaluated in
//! written order; the first match wins.

/// Tokens read as "yes" for the smoker and alcohol answers.
pub const AFFIRMATIVE_TOKENS: [&str; 2] = ["yes", "s"];

pub fn age(years: i64) -> u8 {
    if years < 45 {
        0
    } else if years <= 59 {
        1
    } else {
        2
    }
}

pub fn sex(text: &str) -> u8 {
    let lower = text.to_lowercase();
    if lower.contains("femenino") || lower.contains("female") {
        0
    } else {
        1
    }
}

pub fn systolic(mmhg: i64) -> u8 {
    if mmhg < 120 {
        0
    } else if mmhg <= 139 {
        1
    } else {
        2
    }
}

pub fn diastolic(mmhg: i64) -> u8 {
    if mmhg < 80 {
        0
    } else if mmhg <= 89 {
        1
    } else {
        2
    }
}

pub fn cholesterol(mg_dl: f64) -> u8 {
    if mg_dl < 200.0 {
        0
    } else if mg_dl <= 239.0 {
        1
    } else {
        2
    }
}

pub fn glucose(mg_dl: f64) -> u8 {
    if mg_dl < 100.0 {
        0
    } else if mg_dl <= 125.0 {
        1
    } else {
        2
    }
}

/// Exact token match; "Yes" or "si" do not count.
pub fn yes_token(token: &str) -> u8 {
    u8::from(AFFIRMATIVE_TOKENS.contains(&token))
}

/// Substring contract on free text: any "no" means sedentary, a '1' or '2' means low activity.
pub fn activity(text: &str) -> u8 {
    if text.to_lowercase().contains("no") {
        2
    } else if text.contains('1') || text.contains('2') {
        1
    } else {
        0
    }
}

#[allow(clippy::if_same_then_else)]
pub fn bmi(value: f64) -> u8 {
    // A zero BMI lands in the underweight bucket. Likely unintended upstream,
    // kept for parity with stored diagnoses.
    if value == 0.0 {
        1
    } else if value < 18.5 {
        1
    } else if value < 25.0 {
        0
    } else if value < 30.0 {
        1
    } else {
        2
    }
}
