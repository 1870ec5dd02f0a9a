//! Yew view components for the workout sidebar.
//!
//! Components render from props only; all state lives in the tracker.

use mapty::{DetailRow, Field, FormFields, Kind, Workout};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

fn render_detail(row: &DetailRow) -> Html {
    html! {
        <div class="workout__details">
            <span class="workout__icon">{ row.icon.to_string() }</span>
            <span class="workout__value">{ row.value.clone() }</span>
            <span class="workout__unit">{ row.unit.to_string() }</span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct WorkoutItemProps {
    pub workout: Workout,
    pub onselect: Callback<String>,
}

#[function_component(WorkoutItem)]
pub fn workout_item(props: &WorkoutItemProps) -> Html {
    let workout = &props.workout;
    let onclick = {
        let id = workout.id().to_string();
        let onselect = props.onselect.clone();
        Callback::from(move |_: MouseEvent| onselect.emit(id.clone()))
    };

    html! {
        <li class={classes!("workout", workout.list_class())}
            data-id={workout.id().to_string()}
            {onclick}>
            <h2 class="workout__title">{ workout.description().to_string() }</h2>
            { for workout.detail_rows().iter().map(render_detail) }
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct WorkoutFormProps {
    pub visible: bool,
    /// Hidden without the slide transition, right after a submission.
    pub suppressed: bool,
    pub reveals: u64,
    pub kind: Kind,
    pub fields: FormFields,
    pub on_kind: Callback<Kind>,
    pub on_edit: Callback<(Field, String)>,
    pub on_submit: Callback<()>,
}

/// A labelled numeric input bound to one form field.
fn render_input(
    field: Field,
    placeholder: &str,
    props: &WorkoutFormProps,
    hidden: bool,
    node_ref: NodeRef,
) -> Html {
    let class = match field {
        Field::Distance => "form__input--distance",
        Field::Duration => "form__input--duration",
        Field::Cadence => "form__input--cadence",
        Field::Elevation => "form__input--elevation",
    };
    let oninput = {
        let on_edit = props.on_edit.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_edit.emit((field, input.value()));
        })
    };

    html! {
        <div class={classes!("form__row", hidden.then_some("form__row--hidden"))}>
            <label class="form__label">{ field.label() }</label>
            <input class={classes!("form__input", class)}
                ref={node_ref}
                placeholder={placeholder.to_string()}
                value={props.fields.get(field).to_string()}
                {oninput}
            />
        </div>
    }
}

#[function_component(WorkoutForm)]
pub fn workout_form(props: &WorkoutFormProps) -> Html {
    let distance_ref = use_node_ref();

    // Focus distance every time the form is revealed for a map click.
    {
        let distance_ref = distance_ref.clone();
        let visible = props.visible;
        use_effect_with(props.reveals, move |_| {
            if visible {
                if let Some(input) = distance_ref.cast::<HtmlInputElement>() {
                    if let Err(e) = input.focus() {
                        log::warn!("Could not focus distance input: {:?}", e);
                    }
                }
            }
            || ()
        });
    }

    let onsubmit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit(());
        })
    };

    let onchange = {
        let on_kind = props.on_kind.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            match select.value().parse::<Kind>() {
                Ok(kind) => on_kind.emit(kind),
                Err(err) => log::warn!("{}", err),
            }
        })
    };

    let running = props.kind == Kind::Running;
    let style = props.suppressed.then_some("display: none");

    html! {
        <form class={classes!("form", (!props.visible).then_some("hidden"))} {style} {onsubmit}>
            <div class="form__row">
                <label class="form__label">{ "Type" }</label>
                <select class="form__input form__input--type" {onchange}>
                    <option value="running" selected={running}>{ "Running" }</option>
                    <option value="cycling" selected={!running}>{ "Cycling" }</option>
                </select>
            </div>
            { render_input(Field::Distance, "km", props, false, distance_ref) }
            { render_input(Field::Duration, "min", props, false, NodeRef::default()) }
            { render_input(Field::Cadence, "step/min", props, !running, NodeRef::default()) }
            { render_input(Field::Elevation, "meters", props, running, NodeRef::default()) }
            <button class="form__btn">{ "OK" }</button>
        </form>
    }
}
