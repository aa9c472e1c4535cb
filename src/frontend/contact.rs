use std::{rc::Rc, time::Duration};

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use super::{
    content::EMAIL,
    motion::{section_animation, AnimatedSection},
};
use crate::{
    config::SiteConfig,
    contact::{
        dismiss_when_due, submit, ContactAction, ContactError, ContactMessage, ContactState,
        ContactTransport, Field, SubmitStatus,
    },
    platform::CancelOnDrop,
};

/// Stands in for a mail service: waits, then accepts the message unless the
/// browser reports being offline.
struct SimulatedMailer {
    delay: Duration,
}

impl ContactTransport for SimulatedMailer {
    async fn deliver(&self, message: ContactMessage) -> Result<(), ContactError> {
        let online = window().map(|w| w.navigator().on_line()).unwrap_or(true);
        pause(self.delay).await;
        if !online {
            return Err(ContactError::Offline);
        }
        let payload = serde_json::to_string(&message)
            .map_err(|err| ContactError::Delivery(err.to_string()))?;
        log::debug!("simulated delivery: {payload}");
        Ok(())
    }
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

async fn pause(duration: Duration) {
    TimeoutFuture::new(millis(duration)).await;
}

#[derive(Clone, Default, PartialEq)]
struct ContactModel(ContactState);

impl Reducible for ContactModel {
    type Action = ContactAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = self.0.clone();
        next.apply(action);
        Rc::new(Self(next))
    }
}

fn field_view(model: &UseReducerHandle<ContactModel>, field: Field) -> Html {
    let id = format!("contact-{}", field.as_str());
    let error_id = format!("{id}-error");
    let error = model.0.error_for(field);
    let value = model.0.form.value(field).to_string();
    let disabled = model.0.status == SubmitStatus::Sending;

    let input = if field == Field::Message {
        let oninput = {
            let dispatcher = model.dispatcher();
            Callback::from(move |event: InputEvent| {
                let target: HtmlTextAreaElement = event.target_unchecked_into();
                dispatcher.dispatch(ContactAction::Edit(field, target.value()));
            })
        };
        html! {
            <textarea
                id={id.clone()}
                name={field.as_str()}
                rows="5"
                value={value}
                disabled={disabled}
                aria-invalid={error.is_some().to_string()}
                aria-describedby={error.map(|_| error_id.clone())}
                oninput={oninput}
            />
        }
    } else {
        let oninput = {
            let dispatcher = model.dispatcher();
            Callback::from(move |event: InputEvent| {
                let target: HtmlInputElement = event.target_unchecked_into();
                dispatcher.dispatch(ContactAction::Edit(field, target.value()));
            })
        };
        html! {
            <input
                id={id.clone()}
                name={field.as_str()}
                type={if field == Field::Email { "email" } else { "text" }}
                value={value}
                disabled={disabled}
                aria-invalid={error.is_some().to_string()}
                aria-describedby={error.map(|_| error_id.clone())}
                oninput={oninput}
            />
        }
    };

    html! {
        <div class="form-field">
            <label for={id}>{field.label()}</label>
            {input}
            if let Some(error) = error {
                <p id={error_id} class="field-error" role="alert">{error}</p>
            }
        </div>
    }
}

#[function_component(ContactSection)]
pub fn contact_section() -> Html {
    let site = use_context::<Rc<SiteConfig>>().unwrap_or_default();
    let model = use_reducer(ContactModel::default);

    {
        let dispatcher = model.dispatcher();
        let pending = model.0.pending().cloned();
        let delay = site.submit_delay;
        use_effect_with(model.0.submission, move |_| {
            let guard = CancelOnDrop::default();
            if let Some(message) = pending {
                let cancelled = guard.token();
                spawn_local(async move {
                    let mailer = SimulatedMailer { delay };
                    let outcome = submit(&mailer, message).await;
                    if !cancelled.is_cancelled() {
                        dispatcher.dispatch(outcome);
                    }
                });
            }
            move || drop(guard)
        });
    }

    {
        let dispatcher = model.dispatcher();
        let ttl = site.success_message;
        use_effect_with(model.0.status.clone(), move |status| {
            let guard = CancelOnDrop::default();
            let cancelled = guard.token();
            let status = status.clone();
            spawn_local(async move {
                if let Some(action) = dismiss_when_due(&status, ttl, pause).await {
                    if !cancelled.is_cancelled() {
                        dispatcher.dispatch(action);
                    }
                }
            });
            move || drop(guard)
        });
    }

    let onsubmit = {
        let dispatcher = model.dispatcher();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            dispatcher.dispatch(ContactAction::Submit);
        })
    };

    let sending = model.0.status == SubmitStatus::Sending;
    let banner = match &model.0.status {
        SubmitStatus::Idle | SubmitStatus::Sending => Html::default(),
        SubmitStatus::Sent => html! {
            <p class="form-status success" role="status">
                {"Thanks! Your message is on its way. I'll reply soon."}
            </p>
        },
        SubmitStatus::Failed(reason) => html! {
            <p class="form-status error" role="alert">
                {format!("Sorry, something went wrong: {reason}. You can also email me at {EMAIL}.")}
            </p>
        },
    };

    html! {
        <AnimatedSection id="contact" tag="section" class="section-block" animation={section_animation(&site, "contact")}>
            <h2>{"Contact"}</h2>
            <p class="muted">{"Have a project in mind? Send me a note."}</p>
            <form class="contact-form" novalidate={true} onsubmit={onsubmit}>
                {for Field::ALL.into_iter().map(|field| field_view(&model, field))}
                <button class="button primary" type="submit" disabled={sending}>
                    {if sending { "Sending…" } else { "Send message" }}
                </button>
            </form>
            {banner}
        </AnimatedSection>
    }
}
