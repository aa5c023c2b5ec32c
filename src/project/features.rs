//! Catalog of generator features and the packages they pull in.
//!
//! Feature slugs arrive in [`ProjectConfig::features`] and map to pinned
//! dependency sets here. A separate well-known table covers packages
//! scaffolds commonly import without any feature asking for them.
//!
//! [`ProjectConfig::features`]: super::config::ProjectConfig

/// A feature the generator can be asked to include.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub slug: &'static str,
    pub title: &'static str,
    pub dependencies: &'static [(&'static str, &'static str)],
}

/// Every feature the generator knows how to scaffold.
pub const FEATURES: &[FeatureSpec] = &[
    FeatureSpec {
        slug: "routing",
        title: "Client-side routing",
        dependencies: &[("react-router-dom", "^6.21.1")],
    },
    FeatureSpec {
        slug: "state",
        title: "Global state store",
        dependencies: &[("zustand", "^4.4.7")],
    },
    FeatureSpec {
        slug: "http",
        title: "HTTP client",
        dependencies: &[("axios", "^1.6.5")],
    },
    FeatureSpec {
        slug: "forms",
        title: "Form handling",
        dependencies: &[("react-hook-form", "^7.49.2")],
    },
    FeatureSpec {
        slug: "charts",
        title: "Charts and dashboards",
        dependencies: &[("recharts", "^2.10.4")],
    },
    FeatureSpec {
        slug: "icons",
        title: "Icon set",
        dependencies: &[("lucide-react", "^0.303.0")],
    },
    FeatureSpec {
        slug: "dates",
        title: "Date formatting",
        dependencies: &[("date-fns", "^3.2.0")],
    },
    FeatureSpec {
        slug: "animation",
        title: "Animations",
        dependencies: &[("framer-motion", "^10.18.0")],
    },
];

/// Versions for packages scaffolds import on their own initiative.
const WELL_KNOWN_VERSIONS: &[(&str, &str)] = &[
    ("react", "^18.2.0"),
    ("react-dom", "^18.2.0"),
    ("preact", "^10.19.3"),
    ("prop-types", "^15.8.1"),
    ("clsx", "^2.1.0"),
    ("uuid", "^9.0.1"),
    ("dayjs", "^1.11.10"),
    ("react-icons", "^5.0.1"),
    ("@heroicons/react", "^2.1.1"),
    ("react-hot-toast", "^2.4.1"),
    ("tailwindcss", "^3.4.1"),
];

/// Version used for imports nothing in the catalog covers.
pub const FALLBACK_VERSION: &str = "latest";

pub fn feature(slug: &str) -> Option<&'static FeatureSpec> {
    FEATURES.iter().find(|f| f.slug == slug)
}

/// Dependencies a feature slug requires; empty for unknown slugs.
pub fn dependencies_for(slug: &str) -> &'static [(&'static str, &'static str)] {
    feature(slug).map(|f| f.dependencies).unwrap_or(&[])
}

/// Best-known version for a package, searching feature sets first and
/// the well-known table second.
pub fn pinned_version(package: &str) -> Option<&'static str> {
    for feature in FEATURES {
        if let Some((_, version)) = feature.dependencies.iter().find(|(name, _)| *name == package)
        {
            return Some(version);
        }
    }
    WELL_KNOWN_VERSIONS
        .iter()
        .find(|(name, _)| *name == package)
        .map(|(_, version)| *version)
}

/// Version to record in the manifest for an arbitrary import.
pub fn version_or_fallback(package: &str) -> &'static str {
    pinned_version(package).unwrap_or(FALLBACK_VERSION)
}
