//! Site header: top bar, links, cart badge and account controls.

use crate::models::CurrentUser;

/// Support line shown in the top bar.
pub const SUPPORT_PHONE: &str = "+91-8888888888";

/// A header link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

const LINKS: [NavLink; 4] = [
    NavLink { label: "Medicines", href: "/products" },
    NavLink { label: "Health Products", href: "/products" },
    NavLink { label: "Lab Tests", href: "/lab-tests" },
    NavLink { label: "Consult Doctor", href: "/consult" },
];

/// Cart icon badge: total units in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartBadge {
    pub count: u32,
}

impl CartBadge {
    /// The badge is hidden on an empty cart.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationView {
    /// "Hi, {name}" greeting; `None` shows the Login button.
    pub greeting: Option<String>,
    pub badge: CartBadge,
    pub links: [NavLink; 4],
    pub phone: &'static str,
    pub delivery_note: String,
}

impl NavigationView {
    #[must_use]
    pub fn new(user: Option<&CurrentUser>, cart_count: u32) -> Self {
        Self {
            greeting: user.map(|user| format!("Hi, {}", user.display_name)),
            badge: CartBadge { count: cart_count },
            links: LINKS,
            phone: SUPPORT_PHONE,
            delivery_note: format!(
                "Free delivery above {}",
                crate::cart::FREE_DELIVERY_THRESHOLD
            ),
        }
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.greeting.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use medplus_core::{Email, UserId};

    use super::*;

    #[test]
    fn test_anonymous_navigation() {
        let nav = NavigationView::new(None, 0);
        assert!(!nav.is_signed_in());
        assert!(!nav.badge.is_visible());
        assert_eq!(nav.delivery_note, "Free delivery above ₹499");
        assert_eq!(
            nav.links.iter().map(|l| l.label).collect::<Vec<_>>(),
            vec!["Medicines", "Health Products", "Lab Tests", "Consult Doctor"]
        );
    }

    #[test]
    fn test_signed_in_navigation() {
        let user = CurrentUser::new(
            UserId::random(),
            Some("Asha"),
            Email::parse("asha@example.com").unwrap(),
        );
        let nav = NavigationView::new(Some(&user), 3);
        assert_eq!(nav.greeting.as_deref(), Some("Hi, Asha"));
        assert!(nav.badge.is_visible());
        assert_eq!(nav.badge.count, 3);
    }
}
