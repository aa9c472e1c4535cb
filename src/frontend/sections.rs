use std::rc::Rc;

use yew::prelude::*;

use super::{
    content::{ABOUT, EMAIL, NAME, PROJECTS, ROLE, SKILLS, SOCIAL, STATS, TAGLINE},
    dom,
    motion::{section_animation, use_reduced_motion, AnimatedSection, RevealRegistry},
    theme::{use_theme, ThemeToggle},
};
use crate::{
    config::SiteConfig,
    presets::AnimationKind,
    scroll::{parallax_offset, scroll_progress, ScrollSpy},
};

const HERO_PARALLAX_SPEED: f64 = 0.35;
const STAGGER_SECONDS: f64 = 0.12;

#[hook]
fn use_site() -> Rc<SiteConfig> {
    use_context::<Rc<SiteConfig>>().unwrap_or_default()
}

fn stagger(index: usize) -> Option<f64> {
    Some(index as f64 * STAGGER_SECONDS)
}

#[function_component(Header)]
pub fn header() -> Html {
    let site = use_site();
    let registry = use_context::<RevealRegistry>().unwrap_or_default();
    let active = use_state_eq(|| site.sections.first().map(|section| section.id.clone()));
    let progress = use_state_eq(|| 0.0_f64);

    {
        let site = site.clone();
        let active = active.setter();
        let progress = progress.setter();
        use_effect_with((), move |_| {
            let update = move || {
                let mut spy = ScrollSpy::new(site.scroll_offset_px);
                for section in &site.sections {
                    if let Some(top) = dom::section_top(&section.id) {
                        spy.set_section(&section.id, top);
                    }
                }
                let y = dom::scroll_y();
                active.set(spy.active(y).map(ToString::to_string));
                progress.set(scroll_progress(y, dom::document_height(), dom::viewport_height()));
            };
            update();
            let listener = dom::on_window_event("scroll", move |_| update());
            move || drop(listener)
        });
    }

    let nav_items = site.sections.iter().map(|section| {
        let id = section.id.clone();
        let onclick = {
            let registry = registry.clone();
            let id = id.clone();
            Callback::from(move |event: MouseEvent| {
                event.prevent_default();
                registry.reveal(&id);
                if !dom::scroll_to_section(&id) {
                    log::debug!("no section #{id} to scroll to");
                }
            })
        };
        let current = active.as_deref() == Some(id.as_str());
        html! {
            <li>
                <a
                    href={format!("#{id}")}
                    class={classes!("nav-link", current.then_some("is-active"))}
                    aria-current={current.then_some("true")}
                    onclick={onclick}
                >
                    {section.label.clone()}
                </a>
            </li>
        }
    });

    html! {
        <header class="site-header">
            <div
                class="scroll-progress"
                style={format!("transform: scaleX({:.4});", *progress)}
                aria-hidden="true"
            />
            <a class="brand" href="#home">{NAME}</a>
            <nav aria-label="Primary">
                <ul class="nav-list">{for nav_items}</ul>
            </nav>
            <ThemeToggle />
        </header>
    }
}

#[function_component(Hero)]
pub fn hero() -> Html {
    let site = use_site();
    let reduced = use_reduced_motion();
    let offset = use_state_eq(|| 0.0_f64);

    {
        let offset = offset.setter();
        use_effect_with(reduced, move |reduced| {
            let reduced = *reduced;
            offset.set(parallax_offset(dom::scroll_y(), HERO_PARALLAX_SPEED, reduced));
            let listener = (!reduced).then(|| {
                dom::on_window_event("scroll", move |_| {
                    offset.set(parallax_offset(dom::scroll_y(), HERO_PARALLAX_SPEED, false));
                })
            });
            move || drop(listener)
        });
    }

    html! {
        <AnimatedSection id="home" tag="section" class="hero" animation={section_animation(&site, "home")} threshold={0.0}>
            <div
                class="hero-backdrop"
                style={format!("transform: translate3d(0, {:.1}px, 0);", *offset)}
                aria-hidden="true"
            />
            <div class="hero-copy">
                <p class="eyebrow">{"Hi, I'm"}</p>
                <h1 id="hero-heading">{NAME}</h1>
                <p class="hero-role">{ROLE}</p>
            </div>
            <AnimatedSection animation="fade-up" delay={0.2}>
                <p class="hero-tagline">{TAGLINE}</p>
            </AnimatedSection>
            <AnimatedSection animation="zoom-in" delay={0.4} class="hero-actions">
                <a class="button primary" href="#projects">{"See my work"}</a>
                <a class="button" href="#contact">{"Get in touch"}</a>
            </AnimatedSection>
        </AnimatedSection>
    }
}

#[function_component(About)]
pub fn about() -> Html {
    let site = use_site();

    html! {
        <AnimatedSection id="about" tag="section" class="section-block" animation={section_animation(&site, "about")}>
            <h2>{"About"}</h2>
            {for ABOUT.iter().map(|paragraph| html! { <p>{*paragraph}</p> })}
            <ul class="stats">
                {for STATS.iter().enumerate().map(|(index, stat)| html! {
                    <li>
                        <AnimatedSection animation="zoom-in" delay={stagger(index)}>
                            <span class="stat-value">{stat.value}</span>
                            <span class="stat-label">{stat.label}</span>
                        </AnimatedSection>
                    </li>
                })}
            </ul>
        </AnimatedSection>
    }
}

#[function_component(Projects)]
pub fn projects() -> Html {
    let site = use_site();
    let card_animation = section_animation(&site, "projects");

    html! {
        <AnimatedSection id="projects" tag="section" class="section-block" animation="fade-in" threshold={0.0}>
            <AnimatedSection animation="fade-up">
                <h2>{"Projects"}</h2>
            </AnimatedSection>
            <div class="project-grid">
                {for PROJECTS.iter().enumerate().map(|(index, project)| html! {
                    <AnimatedSection tag="article" class="project-card" animation={card_animation.clone()} delay={stagger(index)}>
                        <h3>{project.title}</h3>
                        <p>{project.description}</p>
                        <ul class="tag-list">
                            {for project.tags.iter().map(|tag| html! { <li>{*tag}</li> })}
                        </ul>
                        <a class="link" href={project.href} target="_blank" rel="noopener noreferrer">
                            {"View project"}
                            <span class="sr-only">{" (opens in a new tab)"}</span>
                        </a>
                    </AnimatedSection>
                })}
            </div>
        </AnimatedSection>
    }
}

#[function_component(Skills)]
pub fn skills() -> Html {
    let site = use_site();

    html! {
        <AnimatedSection id="skills" tag="section" class="section-block" animation={section_animation(&site, "skills")}>
            <h2>{"Skills"}</h2>
            <div class="skill-groups">
                {for SKILLS.iter().enumerate().map(|(index, group)| html! {
                    <AnimatedSection class="skill-group" animation={AttrValue::Static(AnimationKind::FadeUp.key())} delay={stagger(index)}>
                        <h3>{group.title}</h3>
                        <ul>
                            {for group.skills.iter().map(|(skill, level)| html! {
                                <li class="skill">
                                    <span>{*skill}</span>
                                    <span class="skill-meter" role="meter" aria-valuenow={level.to_string()} aria-valuemin="0" aria-valuemax="100">
                                        <span class="skill-fill" style={format!("width: {level}%;")} />
                                    </span>
                                </li>
                            })}
                        </ul>
                    </AnimatedSection>
                })}
            </div>
        </AnimatedSection>
    }
}

#[function_component(Footer)]
pub fn footer() -> Html {
    let theme = use_theme();

    html! {
        <AnimatedSection tag="footer" class="site-footer" animation="fade-in" threshold={0.0}>
            <ul class="row-list">
                {for SOCIAL.iter().map(|(label, href)| html! {
                    <li><a class="link" href={*href} target="_blank" rel="noopener noreferrer">{*label}</a></li>
                })}
                <li><a class="link" href={format!("mailto:{EMAIL}")}>{EMAIL}</a></li>
            </ul>
            <p class="muted">{format!("© {NAME} · {} theme", theme.active.as_str())}</p>
        </AnimatedSection>
    }
}
