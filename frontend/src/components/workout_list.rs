use std::rc::Rc;

use workout_tracker_lib::{
    store::SortKey,
    workout::{Workout, WorkoutId},
};
use gloo_console::error;
use web_sys::HtmlButtonElement;
use yew::prelude::*;

#[derive(PartialEq, Properties, Clone)]
pub struct Props {
    pub workouts: Rc<Vec<Workout>>,
    pub on_select: Callback<WorkoutId>,
    pub on_edit: Callback<WorkoutId>,
    pub on_delete: Callback<WorkoutId>,
}

#[function_component]
pub fn WorkoutList(props: &Props) -> Html {
    html! {
        <ul class="workouts">
            { for props.workouts.iter().map(|workout| html! {
                <WorkoutEntry
                    key={workout.id.as_str().to_owned()}
                    workout={workout.clone()}
                    on_select={props.on_select.clone()}
                    on_edit={props.on_edit.clone()}
                    on_delete={props.on_delete.clone()}
                />
            }) }
        </ul>
    }
}

#[derive(PartialEq, Properties, Clone)]
struct EntryProps {
    workout: Workout,
    on_select: Callback<WorkoutId>,
    on_edit: Callback<WorkoutId>,
    on_delete: Callback<WorkoutId>,
}

#[function_component]
fn WorkoutEntry(props: &EntryProps) -> Html {
    let workout = &props.workout;

    let onclick = {
        let id = workout.id.clone();
        let on_select = props.on_select.clone();
        Callback::from(move |_: MouseEvent| on_select.emit(id.clone()))
    };

    // Buttons must not also pan the map.
    let button = |cb: &Callback<WorkoutId>| {
        let id = workout.id.clone();
        let cb = cb.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            cb.emit(id.clone());
        })
    };

    html! {
        <li class={classes!("workout", format!("workout--{}", workout.kind()))} data-id={workout.id.as_str().to_owned()} {onclick}>
            <h2 class="workout__title">{&workout.description}</h2>
            <button class="workout__edit" onclick={button(&props.on_edit)}>{"Edit"}</button>
            <button class="workout__delete" onclick={button(&props.on_delete)}>{"Delete"}</button>
            { for workout.details().into_iter().map(|detail| html! {
                <div class="workout__details">
                    <span class="workout__icon">{detail.icon}</span>
                    <span class="workout__value">{detail.value}</span>
                    <span class="workout__unit">{detail.unit}</span>
                </div>
            }) }
        </li>
    }
}

#[derive(PartialEq, Properties, Clone)]
pub struct ControlsProps {
    pub on_sort: Callback<SortKey>,
    pub on_reset: Callback<()>,
}

#[function_component]
pub fn ListControls(props: &ControlsProps) -> Html {
    let on_sort = {
        let on_sort = props.on_sort.clone();
        Callback::from(move |e: MouseEvent| {
            let button: HtmlButtonElement = e.target_unchecked_into();
            match button.value().parse::<SortKey>() {
                Ok(key) => on_sort.emit(key),
                Err(e) => error!(format!("{}", e)),
            }
        })
    };

    let on_reset = {
        let on_reset = props.on_reset.clone();
        Callback::from(move |_: MouseEvent| on_reset.emit(()))
    };

    html! {
        <div class="controls">
            <button class="distance_sort" value={SortKey::Distance.as_str()} onclick={on_sort.clone()}>{"Sort by distance"}</button>
            <button class="duration_sort" value={SortKey::Duration.as_str()} onclick={on_sort}>{"Sort by duration"}</button>
            <button class="reset" onclick={on_reset}>{"Reset"}</button>
        </div>
    }
}
