//! Landing hero with the prescription upload call to action.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeroStat {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub stats: [HeroStat; 3],
    pub upload_href: &'static str,
    pub browse_href: &'static str,
}

impl Default for HeroView {
    fn default() -> Self {
        Self {
            title: "Your Health, Our Priority",
            subtitle: "Order medicines online with prescription upload. Genuine products, fast delivery, and expert consultation.",
            stats: [
                HeroStat { value: "50K+", label: "Happy Customers" },
                HeroStat { value: "10K+", label: "Medicines" },
                HeroStat { value: "500+", label: "Cities" },
            ],
            upload_href: "/prescriptions/upload",
            browse_href: "/products",
        }
    }
}
