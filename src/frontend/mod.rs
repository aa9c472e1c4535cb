mod contact;
mod content;
mod dom;
mod motion;
mod sections;
mod theme;

use std::rc::Rc;

use gloo_timers::callback::Timeout;
use web_sys::window;
use yew::prelude::*;

use self::{
    contact::ContactSection,
    content::NAME,
    dom::{BrowserMedia, BrowserStorage, REDUCED_MOTION_QUERY},
    motion::{MotionPreferences, RevealRegistry},
    sections::{About, Footer, Header, Hero, Projects, Skills},
    theme::ThemeProvider,
};
use crate::{
    config::SiteConfig,
    platform::{record_visit, MediaPreferences},
};

#[function_component(Splash)]
fn splash() -> Html {
    html! {
        <div
            class="splash"
            role="status"
            aria-live="polite"
        >
            <span class="splash-mark" aria-hidden="true" />
            <span class="splash-name">{NAME}</span>
        </div>
    }
}

#[function_component(Page)]
fn page() -> Html {
    html! {
        <>
            <a class="skip-link" href="#content">{"Skip to content"}</a>
            <Header />
            <main id="content">
                <Hero />
                <About />
                <Projects />
                <Skills />
                <ContactSection />
            </main>
            <Footer />
        </>
    }
}

#[function_component(App)]
fn app() -> Html {
    let site = use_memo((), |_| SiteConfig::load());
    let registry = use_memo((), |_| RevealRegistry::default());
    let motion = use_state_eq(|| MotionPreferences {
        reduced: BrowserMedia.prefers_reduced_motion(),
    });
    // Splash plays on the first visit only, and never with reduced motion.
    let splash = use_state_eq(|| record_visit(&BrowserStorage) && !motion.reduced);

    {
        let setter = motion.setter();
        use_effect_with((), move |_| {
            let listener = dom::watch_media(REDUCED_MOTION_QUERY, move |reduced| {
                setter.set(MotionPreferences { reduced });
            });
            move || drop(listener)
        });
    }

    {
        let setter = splash.setter();
        let duration = site.splash;
        use_effect_with(*splash, move |showing| {
            let timer = showing.then(|| {
                let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
                Timeout::new(millis, move || setter.set(false))
            });
            move || drop(timer)
        });
    }

    html! {
        <ContextProvider<Rc<SiteConfig>> context={site.clone()}>
            <ContextProvider<MotionPreferences> context={*motion}>
                <ContextProvider<RevealRegistry> context={(*registry).clone()}>
                    <ThemeProvider>
                        if *splash {
                            <Splash />
                        } else {
                            <Page />
                        }
                    </ThemeProvider>
                </ContextProvider<RevealRegistry>>
            </ContextProvider<MotionPreferences>>
        </ContextProvider<Rc<SiteConfig>>>
    }
}

pub fn run() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
