//! Sign-in admission policy and role predicates
//!
//! All bypass-address handling goes through [`AccessPolicy`]; the list is
//! injected once at startup and never consulted anywhere else. The
//! predicates are pure functions over the persisted role and the claimed
//! email, so every endpoint derives authority the same way.

use idealab_db::entities::user::UserRole;

/// Institutional sign-in policy
///
/// Holds the email domain students and staff sign in with, plus the
/// configured super-admin bypass addresses (the legacy escape hatch).
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    domain_suffix: String,
    bypass_emails: Vec<String>,
}

impl AccessPolicy {
    /// Create a policy for one institutional domain
    ///
    /// `domain_suffix` is the bare domain ("poornima.org"); bypass emails
    /// are normalised to lowercase on the way in.
    pub fn new(domain_suffix: impl Into<String>, bypass_emails: Vec<String>) -> Self {
        Self {
            domain_suffix: domain_suffix.into().to_lowercase(),
            bypass_emails: bypass_emails
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// True iff the email belongs to the institutional domain
    pub fn matches_domain(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        match email.rsplit_once('@') {
            Some((_, domain)) => domain == self.domain_suffix,
            None => false,
        }
    }

    /// True iff the email is a configured bypass super-admin address
    ///
    /// This is the only place bypass membership is decided.
    pub fn is_bypass(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.bypass_emails.iter().any(|b| *b == email)
    }

    /// True iff the principal holds super-admin authority
    ///
    /// A bypass address is a super-admin regardless of its stored role.
    pub fn is_super_admin(&self, email: &str, role: UserRole) -> bool {
        self.is_bypass(email) || role == UserRole::SuperAdmin
    }

    /// True iff the principal holds admin-level authority
    pub fn is_admin(&self, email: &str, role: UserRole) -> bool {
        role == UserRole::Admin || self.is_super_admin(email, role)
    }
}

/// Registration id derived from an email: the local part before '@'
pub fn registration_id(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(
            "poornima.org",
            vec![
                "root@idealab.dev".to_string(),
                "Legacy.Admin@example.com".to_string(),
            ],
        )
    }

    #[test]
    fn domain_match_is_exact_and_case_insensitive() {
        let p = policy();
        assert!(p.matches_domain("alice@poornima.org"));
        assert!(p.matches_domain("Alice@POORNIMA.ORG"));
        assert!(!p.matches_domain("alice@notpoornima.org"));
        assert!(!p.matches_domain("alice@poornima.org.evil.com"));
        assert!(!p.matches_domain("no-at-sign"));
    }

    #[test]
    fn bypass_membership_is_case_insensitive() {
        let p = policy();
        assert!(p.is_bypass("root@idealab.dev"));
        assert!(p.is_bypass("legacy.admin@EXAMPLE.com"));
        assert!(!p.is_bypass("someone@idealab.dev"));
    }

    #[test]
    fn super_admin_from_role_or_bypass() {
        let p = policy();
        assert!(p.is_super_admin("x@poornima.org", UserRole::SuperAdmin));
        assert!(p.is_super_admin("root@idealab.dev", UserRole::Student));
        assert!(!p.is_super_admin("x@poornima.org", UserRole::Admin));
        assert!(!p.is_super_admin("x@poornima.org", UserRole::Student));
    }

    #[test]
    fn admin_is_superset_of_super_admin() {
        let p = policy();
        assert!(p.is_admin("x@poornima.org", UserRole::Admin));
        assert!(p.is_admin("x@poornima.org", UserRole::SuperAdmin));
        assert!(p.is_admin("root@idealab.dev", UserRole::Student));
        assert!(!p.is_admin("x@poornima.org", UserRole::Teacher));
        assert!(!p.is_admin("x@poornima.org", UserRole::Student));
    }

    #[test]
    fn registration_id_is_local_part() {
        assert_eq!(registration_id("alice@poornima.org"), "alice");
        assert_eq!(registration_id("no-at-sign"), "no-at-sign");
    }
}
