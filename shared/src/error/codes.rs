//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Employee errors
//! - 4xxx: Attendance errors
//! - 5xxx: Request/approval errors
//! - 6xxx: Project and ticket errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Verification PIN expired
    VerificationCodeExpired = 1005,
    /// Verification PIN invalid
    VerificationCodeInvalid = 1006,
    /// No local account linked to the external identity
    AccountNotLinked = 1007,
    /// Password too short
    PasswordTooShort = 1008,
    /// Verification PIN guessed wrong too often
    TooManyAttempts = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 3001,
    /// Email already registered
    EmailExists = 3002,
    /// Leave detail not found
    LeaveDetailNotFound = 3003,

    // ==================== 4xxx: Attendance ====================
    /// Attendance record not found
    AttendanceNotFound = 4001,
    /// Already checked out for the day
    AlreadyCheckedOut = 4002,
    /// Check-in window closed
    CheckInClosed = 4003,
    /// No check-in recorded yet
    NotCheckedIn = 4004,
    /// Break limit reached
    BreakLimitReached = 4005,
    /// Break duration out of range
    BreakDurationInvalid = 4006,
    /// Attendance already exists for the day
    AttendanceExists = 4007,

    // ==================== 5xxx: Request ====================
    /// Request not found
    RequestNotFound = 5001,
    /// Request type missing or unknown
    RequestTypeInvalid = 5002,
    /// Request no longer pending
    RequestNotPending = 5003,
    /// Approval stage not reachable yet
    ApprovalStageBlocked = 5004,

    // ==================== 6xxx: Project ====================
    /// Project not found
    ProjectNotFound = 6001,
    /// Ticket not found
    TicketNotFound = 6002,
    /// GitHub repository already linked
    RepositoryAlreadyLinked = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Upstream service failed (mail, Google, GitHub)
    ExternalServiceError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Success",
            ErrorCode::Unknown => "Unknown error",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field missing",
            ErrorCode::ValueOutOfRange => "Value out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::TokenExpired => "Token expired",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::VerificationCodeExpired => "Verification code expired",
            ErrorCode::VerificationCodeInvalid => "Invalid verification code",
            ErrorCode::AccountNotLinked => "No account with this email, please contact support",
            ErrorCode::PasswordTooShort => "Password too short",
            ErrorCode::TooManyAttempts => "Too many attempts, request a new code",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Role required",
            ErrorCode::AdminRequired => "Admin role required",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmailExists => "User already exists with this email",
            ErrorCode::LeaveDetailNotFound => "Leave detail not found",

            // Attendance
            ErrorCode::AttendanceNotFound => "Attendance not found",
            ErrorCode::AlreadyCheckedOut => "You can't check in after checking out",
            ErrorCode::CheckInClosed => "You can't check in after 5 PM",
            ErrorCode::NotCheckedIn => "You haven't checked in yet",
            ErrorCode::BreakLimitReached => "Maximum number of breaks reached",
            ErrorCode::BreakDurationInvalid => "Break must be between 0 and 60 minutes",
            ErrorCode::AttendanceExists => "Attendance already recorded for this day",

            // Request
            ErrorCode::RequestNotFound => "Request not found",
            ErrorCode::RequestTypeInvalid => "Please provide a valid request type",
            ErrorCode::RequestNotPending => "Request is no longer pending",
            ErrorCode::ApprovalStageBlocked => "Waiting for project manager approval",

            // Project
            ErrorCode::ProjectNotFound => "Project not found",
            ErrorCode::TicketNotFound => "Ticket not found",
            ErrorCode::RepositoryAlreadyLinked => "Repository already linked",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ExternalServiceError => "External service error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::VerificationCodeExpired),
            1006 => Ok(ErrorCode::VerificationCodeInvalid),
            1007 => Ok(ErrorCode::AccountNotLinked),
            1008 => Ok(ErrorCode::PasswordTooShort),
            1009 => Ok(ErrorCode::TooManyAttempts),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),

            // Employee
            3001 => Ok(ErrorCode::EmployeeNotFound),
            3002 => Ok(ErrorCode::EmailExists),
            3003 => Ok(ErrorCode::LeaveDetailNotFound),

            // Attendance
            4001 => Ok(ErrorCode::AttendanceNotFound),
            4002 => Ok(ErrorCode::AlreadyCheckedOut),
            4003 => Ok(ErrorCode::CheckInClosed),
            4004 => Ok(ErrorCode::NotCheckedIn),
            4005 => Ok(ErrorCode::BreakLimitReached),
            4006 => Ok(ErrorCode::BreakDurationInvalid),
            4007 => Ok(ErrorCode::AttendanceExists),

            // Request
            5001 => Ok(ErrorCode::RequestNotFound),
            5002 => Ok(ErrorCode::RequestTypeInvalid),
            5003 => Ok(ErrorCode::RequestNotPending),
            5004 => Ok(ErrorCode::ApprovalStageBlocked),

            // Project
            6001 => Ok(ErrorCode::ProjectNotFound),
            6002 => Ok(ErrorCode::TicketNotFound),
            6003 => Ok(ErrorCode::RepositoryAlreadyLinked),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::ExternalServiceError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::EmailExists.code(), 3002);
        assert_eq!(ErrorCode::CheckInClosed.code(), 4003);
        assert_eq!(ErrorCode::RequestNotPending.code(), 5003);
        assert_eq!(ErrorCode::ProjectNotFound.code(), 6001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_matches_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::AccountNotLinked,
            ErrorCode::AdminRequired,
            ErrorCode::LeaveDetailNotFound,
            ErrorCode::AttendanceExists,
            ErrorCode::ApprovalStageBlocked,
            ErrorCode::RepositoryAlreadyLinked,
            ErrorCode::ExternalServiceError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::CheckInClosed).unwrap();
        assert_eq!(json, "4003");
        let code: ErrorCode = serde_json::from_str("5001").unwrap();
        assert_eq!(code, ErrorCode::RequestNotFound);
    }
}
