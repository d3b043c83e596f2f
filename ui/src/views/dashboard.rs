//! The dashboard page.
//!
//! State lives in a [`DashboardController`] shared through `Rc<RefCell<_>>`
//! by the event handlers, the frame pump and the gesture coroutine. Dioxus
//! only sees a `revision` signal that is bumped whenever the controller
//! changes, which is what schedules a re-render.

use std::cell::RefCell;
use std::rc::Rc;
use std::task::Poll;

use dioxus::prelude::*;
use futures::StreamExt;

use crate::components::AppHeader;
use crate::core::config::DashboardConfig;
use crate::core::error::LoadError;
use crate::core::platform;
use crate::core::timing::{self, FrameLoop, TickControl, FRAME_INTERVAL_MS};
use crate::dashboard::{
    AnimatedField, DashboardController, GestureRefreshController, GestureState, Profile,
    RefreshOutcome, TouchSignal, ViewState,
};
use crate::snapshot::loader::{HttpSnapshotSource, SnapshotLoader};
use crate::t;

use super::sections::{
    BacktestCard, DetailsPanel, ErrorPanel, Footer, LoadingSkeleton, NoDataPanel,
    PredictionHero, ProfileAllocation, TrendCard, TwoFundAllocation, UpdatedLine,
};

#[derive(Clone)]
struct DashboardHandle {
    controller: Rc<RefCell<DashboardController>>,
    loader: Rc<SnapshotLoader<HttpSnapshotSource>>,
    frames: Rc<RefCell<FrameLoop>>,
    revision: Signal<u64>,
    pump: Coroutine<()>,
}

impl DashboardHandle {
    fn touch(&self) {
        let mut revision = self.revision;
        revision += 1;
    }

    /// Runs one guarded refresh. The spinner is shown only if the load
    /// actually has to wait.
    async fn refresh(&self) -> RefreshOutcome {
        let pending = DashboardController::refresh(&*self.controller, &*self.loader, timing::now);
        futures::pin_mut!(pending);

        let outcome = match futures::poll!(pending.as_mut()) {
            Poll::Ready(outcome) => outcome,
            Poll::Pending => {
                self.touch();
                pending.await
            }
        };

        tracing::debug!(?outcome, "refresh finished");
        if outcome == RefreshOutcome::Applied {
            self.animate();
        }
        self.touch();
        outcome
    }

    fn spawn_refresh(&self) {
        let handle = self.clone();
        platform::spawn_future(async move {
            handle.refresh().await;
        });
    }

    /// Registers the animation ticker (at most one) and wakes the pump.
    fn animate(&self) {
        if self.frames.borrow().is_idle() {
            let controller = self.controller.clone();
            let mut revision = self.revision;
            self.frames.borrow_mut().register(move |now| {
                let running = controller.borrow_mut().tick(now);
                revision += 1;
                if running {
                    TickControl::Continue
                } else {
                    TickControl::Done
                }
            });
        }
        self.pump.send(());
    }

    fn select_profile(&self, profile: Profile) {
        self.controller.borrow_mut().select_profile(profile);
        self.touch();
    }

    fn teardown(&self) {
        self.controller.borrow_mut().teardown();
        self.frames.borrow_mut().clear();
    }
}

#[component]
pub fn Dashboard() -> Element {
    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let _lang_marker = lang_code.as_ref().map(|s| s()).unwrap_or_default();

    let config = use_hook(|| try_consume_context::<DashboardConfig>().unwrap_or_default());
    let frames = use_hook(|| Rc::new(RefCell::new(FrameLoop::new())));
    let revision = use_signal(|| 0u64);
    let gesture = use_signal(GestureState::default);

    // Drives the frame loop while anything is registered; sleeps otherwise.
    let pump = use_coroutine({
        let frames = frames.clone();
        move |mut wake: UnboundedReceiver<()>| {
            let frames = frames.clone();
            async move {
                while wake.next().await.is_some() {
                    while !frames.borrow().is_idle() {
                        timing::sleep_ms(FRAME_INTERVAL_MS).await;
                        frames.borrow_mut().tick(timing::now());
                    }
                }
            }
        }
    });

    let handle = use_hook({
        let config = config.clone();
        move || DashboardHandle {
            controller: Rc::new(RefCell::new(DashboardController::new(config.animation_ms))),
            loader: Rc::new(SnapshotLoader::from_config(&config)),
            frames,
            revision,
            pump,
        }
    });

    let touches = use_coroutine({
        let handle = handle.clone();
        move |signals: UnboundedReceiver<TouchSignal>| {
            let handle = handle.clone();
            let mut gesture = gesture;
            async move {
                let mut controller = GestureRefreshController::new();
                controller
                    .drive(
                        signals,
                        || {
                            let handle = handle.clone();
                            async move {
                                handle.refresh().await;
                            }
                        },
                        |state| gesture.set(*state),
                    )
                    .await;
            }
        }
    });

    use_hook({
        let handle = handle.clone();
        move || {
            tracing::info!(
                platform = ?platform::Platform::current(),
                url = handle.loader.source().url(),
                "dashboard mounted"
            );
            handle.spawn_refresh();
        }
    });

    use_drop({
        let handle = handle.clone();
        move || handle.teardown()
    });

    // Subscribe to controller changes.
    let _revision = revision();

    let (view_state, refreshing, snapshot, profiles, split, banner, prediction_key) = {
        let controller = handle.controller.borrow();
        let banner = controller
            .snapshot()
            .and(controller.last_error())
            .map(LoadError::localized);
        (
            controller.view_state(),
            controller.is_refreshing(),
            controller.snapshot(),
            controller.profiles().cloned(),
            controller.two_fund_split(),
            banner,
            controller.prediction_key(),
        )
    };
    let displayed = |field| handle.controller.borrow().displayed(field);
    let confidence = displayed(AnimatedField::Confidence);
    let equity = displayed(AnimatedField::EquityAllocation);
    let bond = displayed(AnimatedField::BondAllocation);
    let win_rate = displayed(AnimatedField::WinRate);

    let on_refresh = {
        let handle = handle.clone();
        move |_: ()| handle.spawn_refresh()
    };
    let on_retry = {
        let handle = handle.clone();
        move |_: ()| handle.spawn_refresh()
    };
    let on_select = {
        let handle = handle.clone();
        move |profile: Profile| handle.select_profile(profile)
    };
    let on_keydown = {
        let handle = handle.clone();
        move |evt: KeyboardEvent| {
            let is_r = matches!(evt.key(), Key::Character(ref c) if c.eq_ignore_ascii_case("r"));
            let shortcut = evt.modifiers().intersects(Modifiers::CONTROL | Modifiers::META);
            if is_r && shortcut {
                evt.prevent_default();
                handle.spawn_refresh();
            }
        }
    };

    let body = match view_state {
        ViewState::Loading => rsx! { LoadingSkeleton {} },
        ViewState::Failed(message) => rsx! { ErrorPanel { message, on_retry } },
        ViewState::NoData(message) => rsx! { NoDataPanel { message, on_retry } },
        ViewState::Ready => match snapshot {
            None => rsx! { LoadingSkeleton {} },
            Some(loaded) => {
                let snapshot = &loaded.snapshot;
                rsx! {
                    UpdatedLine {
                        display: loaded.updated_display(),
                        age: loaded.staleness_label(),
                    }
                    if let Some(banner) = banner {
                        div { class: "banner banner--error", role: "alert", "{banner}" }
                    }
                    if let Some(prediction) = snapshot.prediction.clone() {
                        PredictionHero { key: "{prediction_key}", prediction: prediction.clone(), confidence }
                        if let Some(trend) = prediction.trend.clone() {
                            TrendCard { trend }
                        }
                        if let Some(engine) = profiles {
                            ProfileAllocation { engine, on_select }
                        } else {
                            TwoFundAllocation { split, equity, bond }
                        }
                        if let Some(backtest) = snapshot.backtest.clone() {
                            BacktestCard { backtest, win_rate, frame: config.chart }
                        }
                        if let Some(features) = prediction.ml_features.clone() {
                            DetailsPanel {
                                features,
                                details: prediction.ml_details.clone(),
                                backtest: snapshot.backtest.clone(),
                            }
                        }
                    }
                    Footer { model_info: snapshot.model_info.clone() }
                }
            }
        },
    };

    let pull = gesture().indicator();

    rsx! {
        div {
            class: "dashboard",
            tabindex: "-1",
            onmounted: move |element: MountedEvent| async move {
                let _ = element.set_focus(true).await;
            },
            onkeydown: on_keydown,
            ontouchstart: move |evt: TouchEvent| {
                if let Some(touch) = evt.touches().first() {
                    touches.send(TouchSignal::Start {
                        y: touch.client_coordinates().y,
                        scroll_offset: platform::scroll_offset(),
                    });
                }
            },
            ontouchmove: move |evt: TouchEvent| {
                if let Some(touch) = evt.touches().first() {
                    touches.send(TouchSignal::Move { y: touch.client_coordinates().y });
                }
            },
            ontouchend: move |_| touches.send(TouchSignal::End),
            ontouchcancel: move |_| touches.send(TouchSignal::End),

            div { style: "display:none", "{_lang_marker}" }

            if let Some(indicator) = pull {
                div {
                    class: if indicator.armed { "pull pull--armed" } else { "pull" },
                    style: "{indicator.style()}",
                    aria_hidden: "true",
                    div { class: "pull__spinner" }
                    span { class: "pull__hint",
                        if indicator.armed { {t!("pull-release")} } else { {t!("pull-hint")} }
                    }
                }
            }

            AppHeader { refreshing, on_refresh }

            main { class: "dashboard__content", aria_busy: refreshing, {body} }
        }
    }
}
