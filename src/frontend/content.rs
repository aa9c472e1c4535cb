pub const NAME: &str = "Alex Morgan";
pub const ROLE: &str = "Software engineer building fast, accessible web experiences";
pub const TAGLINE: &str =
    "I design and ship interfaces that feel effortless, backed by systems that stay dependable.";
pub const EMAIL: &str = "hello@alexmorgan.dev";

pub const ABOUT: [&str; 2] = [
    "I have spent the last six years building products across the stack, from rendering pipelines to design systems used by dozens of teams.",
    "Lately I focus on WebAssembly front ends written in Rust, where strong types and small bundles make motion-heavy interfaces a pleasure to maintain.",
];

pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

pub const STATS: [Stat; 3] = [
    Stat {
        value: "6+",
        label: "years shipping software",
    },
    Stat {
        value: "40+",
        label: "projects delivered",
    },
    Stat {
        value: "12",
        label: "open-source crates",
    },
];

pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub href: &'static str,
}

pub const PROJECTS: [Project; 4] = [
    Project {
        title: "Tidewater",
        description: "Real-time tide and swell dashboard rendering thousands of sensor readings at 60 fps.",
        tags: &["Rust", "WebAssembly", "WebGL"],
        href: "https://github.com/alexmorgan/tidewater",
    },
    Project {
        title: "Ledgerline",
        description: "Offline-first budgeting app with conflict-free sync between devices.",
        tags: &["TypeScript", "CRDT", "IndexedDB"],
        href: "https://github.com/alexmorgan/ledgerline",
    },
    Project {
        title: "Gallery Motion",
        description: "Scroll-driven storytelling toolkit used for three museum exhibitions.",
        tags: &["Yew", "CSS", "Animation"],
        href: "https://github.com/alexmorgan/gallery-motion",
    },
    Project {
        title: "Quill CLI",
        description: "Static site generator with incremental rebuilds and image pipelines.",
        tags: &["Rust", "CLI", "Tooling"],
        href: "https://github.com/alexmorgan/quill",
    },
];

pub struct SkillGroup {
    pub title: &'static str,
    pub skills: &'static [(&'static str, u8)],
}

pub const SKILLS: [SkillGroup; 3] = [
    SkillGroup {
        title: "Languages",
        skills: &[("Rust", 90), ("TypeScript", 85), ("Python", 70)],
    },
    SkillGroup {
        title: "Frontend",
        skills: &[("Yew / Leptos", 85), ("React", 80), ("CSS animation", 90)],
    },
    SkillGroup {
        title: "Platform",
        skills: &[("PostgreSQL", 75), ("Docker", 70), ("CI/CD", 80)],
    },
];

pub const SOCIAL: [(&str, &str); 3] = [
    ("GitHub", "https://github.com/alexmorgan"),
    ("LinkedIn", "https://www.linkedin.com/in/alexmorgan"),
    ("Resume", "/resume.pdf"),
];
