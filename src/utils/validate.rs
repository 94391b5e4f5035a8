use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FieldIssue;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const TASK_TITLE_MIN: usize = 3;
pub const TASK_TITLE_MAX: usize = 100;
pub const TASK_DESCRIPTION_MIN: usize = 10;
pub const TASK_DESCRIPTION_MAX: usize = 1000;
pub const FEEDBACK_MAX: usize = 500;
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;
pub const ORG_NAME_MAX: usize = 100;
pub const ORG_DESCRIPTION_MAX: usize = 500;
pub const GROUP_CAPACITY_DEFAULT: i32 = 15;
pub const GROUP_CAPACITY_MAX: i32 = 200;

/// 按字符数检查长度区间
fn check_length(value: &str, min: usize, max: usize) -> bool {
    let len = value.chars().count();
    (min..=max).contains(&len)
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_full_name(name: &str) -> Result<(), &'static str> {
    if !check_length(name.trim(), FULL_NAME_MIN, FULL_NAME_MAX) {
        return Err("Full name must be between 2 and 50 characters");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN {
        return Err("Password must be at least 6 characters long");
    }
    Ok(())
}

pub fn validate_task_title(title: &str) -> Result<(), &'static str> {
    if !check_length(title.trim(), TASK_TITLE_MIN, TASK_TITLE_MAX) {
        return Err("Title must be between 3 and 100 characters");
    }
    Ok(())
}

pub fn validate_task_description(description: &str) -> Result<(), &'static str> {
    if !check_length(description.trim(), TASK_DESCRIPTION_MIN, TASK_DESCRIPTION_MAX) {
        return Err("Description must be between 10 and 1000 characters");
    }
    Ok(())
}

pub fn validate_deadline(
    deadline: chrono::DateTime<chrono::Utc>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), &'static str> {
    if deadline <= now {
        return Err("Deadline must be in the future");
    }
    Ok(())
}

pub fn validate_score(score: f64) -> Result<(), &'static str> {
    if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return Err("Score must be between 0 and 100");
    }
    Ok(())
}

/// 反馈可选；给出时去除首尾空白后不超过 500 字符
pub fn validate_feedback(feedback: Option<&str>) -> Result<(), &'static str> {
    if let Some(text) = feedback
        && text.trim().chars().count() > FEEDBACK_MAX
    {
        return Err("Feedback must be at most 500 characters");
    }
    Ok(())
}

/// 教育中心与小组名称
pub fn validate_org_name(name: &str) -> Result<(), &'static str> {
    if !check_length(name.trim(), 1, ORG_NAME_MAX) {
        return Err("Name must be between 1 and 100 characters");
    }
    Ok(())
}

pub fn validate_org_description(description: Option<&str>) -> Result<(), &'static str> {
    match description {
        Some(text) if text.trim().chars().count() > ORG_DESCRIPTION_MAX => {
            Err("Description must be at most 500 characters")
        }
        _ => Ok(()),
    }
}

pub fn validate_group_capacity(max_students: i32) -> Result<(), &'static str> {
    if !(1..=GROUP_CAPACITY_MAX).contains(&max_students) {
        return Err("Group capacity must be between 1 and 200");
    }
    Ok(())
}

/// 收集字段级校验问题
#[derive(Debug, Default)]
pub struct FieldIssues(Vec<FieldIssue>);

impl FieldIssues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &str, result: Result<(), &'static str>) -> &mut Self {
        if let Err(message) = result {
            self.0.push(FieldIssue::new(field, message));
        }
        self
    }

    pub fn into_result(self) -> Result<(), Vec<FieldIssue>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}
