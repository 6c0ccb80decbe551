use crate::domain::models::therapist::Therapist;

/// Authenticated principal as asserted by the external identity provider.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub role: String, // "admin" or "therapist"
    pub email: String,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Single authorization rule for booking mutation: admins, or the therapist
/// who owns the booking. Every mutating call site goes through here.
pub fn can_mutate_booking(actor: &Actor, therapist: &Therapist) -> bool {
    actor.is_admin() || (actor.role == "therapist" && actor.user_id == therapist.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::therapist::{NewTherapistParams, Therapist};

    fn therapist_owned_by(user_id: &str) -> Therapist {
        Therapist::new(NewTherapistParams {
            user_id: user_id.into(),
            slug: "dr-a".into(),
            name: "Dr. A".into(),
            email: "a@example.com".into(),
            timezone: "UTC".into(),
            default_session_duration_min: 50,
            buffer_min: 10,
            advance_booking_days: 30,
            min_booking_notice_hours: 12,
        })
    }

    #[test]
    fn test_admin_may_mutate_any_booking() {
        let actor = Actor { user_id: "u-admin".into(), role: "admin".into(), email: "x@y".into() };
        assert!(can_mutate_booking(&actor, &therapist_owned_by("someone-else")));
    }

    #[test]
    fn test_owner_therapist_may_mutate() {
        let actor = Actor { user_id: "u-1".into(), role: "therapist".into(), email: "x@y".into() };
        assert!(can_mutate_booking(&actor, &therapist_owned_by("u-1")));
        assert!(!can_mutate_booking(&actor, &therapist_owned_by("u-2")));
    }

    #[test]
    fn test_other_roles_may_not() {
        let actor = Actor { user_id: "u-1".into(), role: "client".into(), email: "x@y".into() };
        assert!(!can_mutate_booking(&actor, &therapist_owned_by("u-1")));
    }
}
