use std::rc::Rc;

use chrono::Local;
use components::{
    map_component::{Focus, MapComponent},
    workout_form::WorkoutForm,
    workout_list::{ListControls, WorkoutList},
};
use gloo_console::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_web::MakeWebConsoleWriter;
use workout_tracker_lib::{
    input::FormFields,
    store::SortKey,
    tracker::{Mode, Tracker, TrackerError},
    workout::{Coords, Workout, WorkoutId},
};
use yew::prelude::*;

use crate::browser::LocalStorage;

mod browser;
mod components;
mod config;

enum MainMsg {
    Located(Coords),
    LocationFailed(String),
    MapClicked(Coords),
    FormChanged(FormFields),
    Submit,
    Cancel,
    Edit(WorkoutId),
    Delete(WorkoutId),
    Select(WorkoutId),
    Sort(SortKey),
    Reset,
}

struct Model {
    tracker: Tracker<LocalStorage>,
    home: Option<Coords>,
    form: FormFields,
    focus: Option<Focus>,
    // Snapshots handed to the map and the list
    workouts: Rc<Vec<Workout>>,
    listed: Rc<Vec<Workout>>,
}

impl Model {
    fn refresh(&mut self) {
        self.workouts = Rc::new(self.tracker.workouts().cloned().collect());
        self.listed = Rc::new(self.tracker.listed().into_iter().cloned().collect());
    }

    /// Empties the form but keeps the selected type.
    fn clear_form(&mut self) {
        self.form = FormFields {
            kind: self.form.kind,
            ..Default::default()
        };
    }

    fn submit(&mut self) -> Result<(), TrackerError> {
        let editing = matches!(self.tracker.mode(), Mode::Editing { .. });
        let workout = if editing {
            self.tracker.commit_edit(&self.form)?
        } else {
            self.tracker.submit_new(&self.form, Local::now().fixed_offset())?
        };
        info!(format!("Saved workout {}: {}", workout.id, workout.description));
        self.clear_form();
        Ok(())
    }
}

fn report(e: &TrackerError) {
    error!(format!("{}", e));
    browser::alert(&e.to_string());
}

impl Component for Model {
    type Message = MainMsg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link().clone();

        let tracker = match Tracker::load(LocalStorage::open()) {
            Ok(tracker) => {
                let skipped = tracker.skipped_on_load();
                if skipped > 0 {
                    error!(format!("Dropped {} unreadable saved workouts", skipped));
                    browser::alert(&format!("{} saved workouts could not be read and were dropped", skipped));
                }
                tracker
            }
            Err((storage, e)) => {
                report(&e);
                Tracker::new(storage)
            }
        };

        browser::request_position(link.callback(MainMsg::Located), link.callback(MainMsg::LocationFailed));

        let mut model = Self {
            tracker,
            home: None,
            form: FormFields::default(),
            focus: None,
            workouts: Rc::default(),
            listed: Rc::default(),
        };
        model.refresh();
        model
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            MainMsg::Located(coords) => {
                info!(format!("https://www.google.com/maps/@{},{}", coords.lat(), coords.lng()));
                self.home = Some(coords);
            }
            MainMsg::LocationFailed(reason) => {
                error!(format!("Geolocation failed: {}", reason));
                browser::alert(config::POSITION_DENIED_MESSAGE);
                return false;
            }
            MainMsg::MapClicked(coords) => {
                if self.tracker.mode() == &Mode::Idle {
                    self.clear_form();
                }
                self.tracker.map_clicked(coords);
            }
            MainMsg::FormChanged(fields) => {
                self.form = fields;
            }
            MainMsg::Submit => {
                if let Err(e) = self.submit() {
                    report(&e);
                }
            }
            MainMsg::Cancel => {
                self.tracker.cancel();
                self.clear_form();
            }
            MainMsg::Edit(id) => match self.tracker.begin_edit(&id) {
                Ok(fields) => self.form = fields,
                Err(e) => report(&e),
            },
            MainMsg::Delete(id) => {
                let was_editing = self.tracker.mode() == &Mode::Editing { id: id.clone() };
                if let Err(e) = self.tracker.delete(&id) {
                    report(&e);
                }
                if was_editing {
                    self.clear_form();
                }
            }
            MainMsg::Select(id) => {
                let Some(workout) = self.tracker.get(&id) else {
                    return false;
                };
                let seq = self.focus.map_or(0, |f| f.seq.wrapping_add(1));
                self.focus = Some(Focus { coords: workout.coords, seq });
            }
            MainMsg::Sort(key) => {
                info!(format!("Sorting by {}", key));
                self.tracker.sort(key);
            }
            MainMsg::Reset => {
                match self.tracker.reset() {
                    Ok(()) => browser::reload(),
                    Err(e) => report(&e),
                }
            }
        }

        self.refresh();
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let editing = matches!(self.tracker.mode(), Mode::Editing { .. });

        html! { <>
            <div class="sidebar">
                <h1 class="logo">{"Workout Tracker"}</h1>
                if self.tracker.is_form_open() {
                    <WorkoutForm
                        fields={self.form.clone()}
                        editing={editing}
                        on_change={link.callback(MainMsg::FormChanged)}
                        on_submit={link.callback(|()| MainMsg::Submit)}
                        on_cancel={link.callback(|()| MainMsg::Cancel)}
                    />
                }
                <ListControls
                    on_sort={link.callback(MainMsg::Sort)}
                    on_reset={link.callback(|()| MainMsg::Reset)}
                />
                <WorkoutList
                    workouts={self.listed.clone()}
                    on_select={link.callback(MainMsg::Select)}
                    on_edit={link.callback(MainMsg::Edit)}
                    on_delete={link.callback(MainMsg::Delete)}
                />
            </div>
            if let Some(center) = self.home {
                <MapComponent
                    center={center}
                    workouts={self.workouts.clone()}
                    focus={self.focus}
                    on_click={link.callback(MainMsg::MapClicked)}
                />
            } else {
                <div class="map map--pending">{"Waiting for your location..."}</div>
            }
        </> }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config::LOG_FILTER))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .without_time()
                .with_writer(MakeWebConsoleWriter::new()),
        )
        .init();

    yew::Renderer::<Model>::new().render();
}
