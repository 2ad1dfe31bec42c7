use super::require_text;
use crate::entity::Loan;
use crate::error::{CoreResult, IntegrityError, StateError, ValidationError};
use crate::types::{LoanId, MemberNumber};
use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Maximum number of simultaneous loans per patron.
pub const MAX_ACTIVE_LOANS: usize = 3;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,6}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

fn validate_email(value: &str) -> Result<String, ValidationError> {
    let email = require_text("email", value)?;
    if email_regex().is_match(&email) {
        Ok(email)
    } else {
        Err(ValidationError::InvalidEmail {
            value: value.to_string(),
        })
    }
}

/// A registered library user.
///
/// The active-loan list holds the ids of loans owned by the repository and
/// only changes through the lending engine. Two patrons are equal when their
/// member numbers are equal.
#[derive(Debug, Clone)]
pub struct Patron {
    member_number: MemberNumber,
    first_name: String,
    last_name: String,
    email: String,
    active_loans: Vec<LoanId>,
}

impl Patron {
    /// Registers a new patron with no loans.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name, a malformed member
    /// number or a malformed email address.
    pub fn new(
        first_name: &str,
        last_name: &str,
        member_number: &str,
        email: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            first_name: require_text("first name", first_name)?,
            last_name: require_text("last name", last_name)?,
            member_number: MemberNumber::parse(member_number)?,
            email: validate_email(email)?,
            active_loans: Vec::new(),
        })
    }

    /// Returns the member number.
    #[must_use]
    pub fn member_number(&self) -> &MemberNumber {
        &self.member_number
    }

    /// Returns the first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Returns the last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns "first last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the ids of the patron's active loans, oldest first.
    #[must_use]
    pub fn active_loans(&self) -> &[LoanId] {
        &self.active_loans
    }

    /// Returns the number of active loans.
    #[must_use]
    pub fn active_loan_count(&self) -> usize {
        self.active_loans.len()
    }

    /// Returns true if the patron is below the loan limit.
    #[must_use]
    pub fn can_borrow(&self) -> bool {
        self.active_loans.len() < MAX_ACTIVE_LOANS
    }

    /// Replaces the first name.
    ///
    /// # Errors
    ///
    /// Returns `Empty`; the patron is unchanged.
    pub fn set_first_name(&mut self, value: &str) -> Result<(), ValidationError> {
        self.first_name = require_text("first name", value)?;
        Ok(())
    }

    /// Replaces the last name.
    ///
    /// # Errors
    ///
    /// Returns `Empty`; the patron is unchanged.
    pub fn set_last_name(&mut self, value: &str) -> Result<(), ValidationError> {
        self.last_name = require_text("last name", value)?;
        Ok(())
    }

    /// Replaces the email address.
    ///
    /// # Errors
    ///
    /// Returns `Empty` or `InvalidEmail`; the patron is unchanged.
    pub fn set_email(&mut self, value: &str) -> Result<(), ValidationError> {
        self.email = validate_email(value)?;
        Ok(())
    }

    /// Records `loan` as active for this patron.
    pub(crate) fn attach_loan(&mut self, loan: &Loan) -> CoreResult<()> {
        if loan.member_number() != &self.member_number {
            return Err(IntegrityError::LoanPatronMismatch {
                loan: loan.id(),
                owner: loan.member_number().clone(),
                member_number: self.member_number.clone(),
            }
            .into());
        }
        if !self.can_borrow() {
            return Err(StateError::LoanLimitExceeded {
                member_number: self.member_number.clone(),
                limit: MAX_ACTIVE_LOANS,
            }
            .into());
        }
        self.active_loans.push(loan.id());
        Ok(())
    }

    /// Removes `id` from the active list. Returns false if it was not there.
    pub(crate) fn detach_loan(&mut self, id: LoanId) -> bool {
        match self.active_loans.iter().position(|l| *l == id) {
            Some(index) => {
                self.active_loans.remove(index);
                true
            }
            None => false,
        }
    }
}

impl PartialEq for Patron {
    fn eq(&self, other: &Self) -> bool {
        self.member_number == other.member_number
    }
}

impl Eq for Patron {}

impl Hash for Patron {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.member_number.hash(state);
    }
}

impl fmt::Display for Patron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.first_name, self.last_name, self.member_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Book;
    use crate::error::CoreError;
    use chrono::NaiveDate;

    fn mario() -> Patron {
        Patron::new("Mario", "Rossi", "0512100001", "mario.rossi@studenti.unisa.it").unwrap()
    }

    fn loan(id: u64, patron: &Patron) -> Loan {
        let book = Book::new("Dune", &["Frank Herbert"], None, "9780441172719", 1).unwrap();
        Loan::new(
            LoanId::new(id),
            patron,
            &book,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn new_validates_fields() {
        assert_eq!(
            Patron::new(" ", "Rossi", "0512100001", "m@x.it"),
            Err(ValidationError::Empty {
                field: "first name"
            })
        );
        assert!(matches!(
            Patron::new("Mario", "Rossi", "123", "m@x.it"),
            Err(ValidationError::InvalidMemberNumber { .. })
        ));
        assert!(matches!(
            Patron::new("Mario", "Rossi", "0512100001", "not-an-email"),
            Err(ValidationError::InvalidEmail { .. })
        ));
    }

    #[test]
    fn email_pattern() {
        for ok in ["a@b.co", "first.last+tag@sub.domain.museum", "X_Y%z@host-1.org"] {
            assert!(validate_email(ok).is_ok(), "{ok}");
        }
        for bad in ["a@b", "a@b.c", "@b.com", "a b@c.com", "a@b.toolongtld", "a@@b.com"] {
            assert!(validate_email(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn new_patron_has_no_loans() {
        let patron = mario();
        assert!(patron.active_loans().is_empty());
        assert!(patron.can_borrow());
        assert_eq!(patron.full_name(), "Mario Rossi");
    }

    #[test]
    fn attach_stops_at_limit() {
        let mut patron = mario();
        for id in 1..=3 {
            let l = loan(id, &patron);
            patron.attach_loan(&l).unwrap();
        }
        assert!(!patron.can_borrow());

        let fourth = loan(4, &patron);
        let err = patron.attach_loan(&fourth).unwrap_err();
        assert!(matches!(
            err,
            CoreError::State(StateError::LoanLimitExceeded { limit: 3, .. })
        ));
        assert_eq!(patron.active_loans(), [LoanId::new(1), LoanId::new(2), LoanId::new(3)]);
    }

    #[test]
    fn attach_rejects_foreign_loan() {
        let other = Patron::new("Anna", "Bianchi", "0512100002", "anna@x.it").unwrap();
        let foreign = loan(1, &other);
        let mut patron = mario();
        assert!(matches!(
            patron.attach_loan(&foreign),
            Err(CoreError::Integrity(IntegrityError::LoanPatronMismatch { .. }))
        ));
        assert!(patron.active_loans().is_empty());
    }

    #[test]
    fn detach_removes_once() {
        let mut patron = mario();
        let l = loan(1, &patron);
        patron.attach_loan(&l).unwrap();
        assert!(patron.detach_loan(l.id()));
        assert!(!patron.detach_loan(l.id()));
        assert!(patron.can_borrow());
    }

    #[test]
    fn failed_setter_leaves_patron_unchanged() {
        let mut patron = mario();
        assert!(patron.set_email("broken").is_err());
        assert!(patron.set_last_name("").is_err());
        assert_eq!(patron.email(), "mario.rossi@studenti.unisa.it");
        assert_eq!(patron.last_name(), "Rossi");

        patron.set_first_name("Luigi").unwrap();
        assert_eq!(patron.to_string(), "Luigi Rossi (0512100001)");
    }
}
