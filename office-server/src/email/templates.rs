use super::EmailMessage;

pub fn verification_pin(to: &str, pin: &str, ttl_minutes: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your NextOfficeFlow account".into(),
        body: format!(
            "Your verification code is: {pin}\n\
             Valid for {ttl_minutes} minutes."
        ),
    }
}

pub fn password_reset(to: &str, pin: &str, ttl_minutes: i64) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your NextOfficeFlow password".into(),
        body: format!(
            "Your password reset code is: {pin}\n\
             Valid for {ttl_minutes} minutes.\n\n\
             If you did not ask for a reset you can ignore this message."
        ),
    }
}

pub fn announcement(to: &str, title: &str, body: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Announcement: {title}"),
        body: body.to_string(),
    }
}

pub fn resignation(to: &str, employee_name: &str, reason: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Resignation letter from {employee_name}"),
        body: format!("{employee_name} has submitted a resignation.\n\n{reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_mail_carries_code_and_lifetime() {
        let mail = verification_pin("x@y.z", "482913", 15);
        assert_eq!(mail.to, "x@y.z");
        assert!(mail.body.contains("482913"));
        assert!(mail.body.contains("15 minutes"));
    }

    #[test]
    fn resignation_names_the_employee() {
        let mail = resignation("hr@corp.test", "Dana", "Moving abroad");
        assert!(mail.subject.contains("Dana"));
        assert!(mail.body.ends_with("Moving abroad"));
    }
}
