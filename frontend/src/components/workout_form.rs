use web_sys::{HtmlInputElement, HtmlSelectElement};
use workout_tracker_lib::{input::FormFields, workout::WorkoutType};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct FormProps {
    pub fields: FormFields,
    /// Submitting commits an edit instead of creating a workout.
    pub editing: bool,
    pub on_change: Callback<FormFields>,
    pub on_submit: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component]
pub fn WorkoutForm(props: &FormProps) -> Html {
    let distance_ref = use_node_ref();

    {
        let distance_ref = distance_ref.clone();
        use_effect_with(props.editing, move |_| {
            if let Some(input) = distance_ref.cast::<HtmlInputElement>() {
                let _ = input.focus();
            }
        });
    }

    let on_type = {
        let fields = props.fields.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Ok(kind) = select.value().parse::<WorkoutType>() {
                on_change.emit(FormFields { kind, ..fields.clone() });
            }
        })
    };

    let field_input = |set: fn(&mut FormFields, String)| {
        let fields = props.fields.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut fields = fields.clone();
            set(&mut fields, input.value());
            on_change.emit(fields);
        })
    };

    let onsubmit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit(());
        })
    };

    let on_cancel = {
        let on_cancel = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| on_cancel.emit(()))
    };

    let fields = &props.fields;
    let running = fields.kind == WorkoutType::Running;

    html! {
        <form class="form" {onsubmit}>
            <div class="form__row">
                <label class="form__label">{"Type"}</label>
                <select class="form__input form__input--type" onchange={on_type}>
                    <option value="running" selected={running}>{"Running"}</option>
                    <option value="cycling" selected={!running}>{"Cycling"}</option>
                </select>
            </div>
            <div class="form__row">
                <label class="form__label">{"Distance"}</label>
                <input class="form__input form__input--distance" placeholder="km" ref={distance_ref}
                    value={fields.distance.clone()} oninput={field_input(|f, v| f.distance = v)} />
            </div>
            <div class="form__row">
                <label class="form__label">{"Duration"}</label>
                <input class="form__input form__input--duration" placeholder="min"
                    value={fields.duration.clone()} oninput={field_input(|f, v| f.duration = v)} />
            </div>
            <div class={classes!("form__row", (!running).then_some("form__row--hidden"))}>
                <label class="form__label">{"Cadence"}</label>
                <input class="form__input form__input--cadence" placeholder="step/min"
                    value={fields.cadence.clone()} oninput={field_input(|f, v| f.cadence = v)} />
            </div>
            <div class={classes!("form__row", running.then_some("form__row--hidden"))}>
                <label class="form__label">{"Elev Gain"}</label>
                <input class="form__input form__input--elevation" placeholder="meters"
                    value={fields.elevation.clone()} oninput={field_input(|f, v| f.elevation = v)} />
            </div>
            <div class="form__row form__row--actions">
                <button class="form__btn" type="submit">{ if props.editing { "Save changes" } else { "OK" } }</button>
                <button class="form__btn" type="button" onclick={on_cancel}>{"Cancel"}</button>
            </div>
        </form>
    }
}
