use std::{collections::HashMap, rc::Rc};

use gloo_console::{error, info};
use gloo_utils::document;
use leaflet::{LatLng, Map, MapOptions, Marker, MouseEvent, Popup, PopupOptions, TileLayer, TileLayerOptions};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    js_sys::{Function, Object, Reflect},
    Element, HtmlElement, Node,
};
use workout_tracker_lib::{
    sync::{marker_changes, MarkerChange},
    workout::{Coords, Workout, WorkoutId},
};
use yew::prelude::*;

use crate::config;

/// Request to move the viewport. `seq` makes repeated requests for the
/// same spot distinct.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Focus {
    pub coords: Coords,
    pub seq: u32,
}

pub struct MapComponent {
    map: Map,
    container: HtmlElement,
    markers: HashMap<WorkoutId, Marker>,
    _on_click: Closure<dyn Fn(MouseEvent)>,
}

#[derive(PartialEq, Properties, Clone)]
pub struct Props {
    pub center: Coords,
    pub workouts: Rc<Vec<Workout>>,
    pub focus: Option<Focus>,
    pub on_click: Callback<Coords>,
}

impl MapComponent {
    fn render_map(&self) -> Html {
        let node: &Node = &self.container.clone().into();
        Html::VRef(node.clone())
    }

    fn apply(&mut self, changes: Vec<MarkerChange>, workouts: &[Workout]) {
        for change in changes {
            match change {
                MarkerChange::Add(id) | MarkerChange::Refresh(id) => {
                    if let Some(old) = self.markers.remove(&id) {
                        old.remove();
                    }
                    if let Some(workout) = workouts.iter().find(|w| w.id == id) {
                        let marker = make_marker(workout);
                        marker.add_to(&self.map);
                        marker.open_popup();
                        self.markers.insert(id, marker);
                    }
                }
                MarkerChange::Remove(id) => {
                    if let Some(marker) = self.markers.remove(&id) {
                        marker.remove();
                        info!(format!("Removed marker {}", id));
                    }
                }
            }
        }
    }
}

impl Component for MapComponent {
    type Message = ();
    type Properties = Props;

    fn create(ctx: &Context<Self>) -> Self {
        let container: Element = document().create_element("div").unwrap();
        let container: HtmlElement = container.dyn_into().unwrap();
        container.set_class_name("map");

        let leaflet_map = Map::new_with_element(&container, &MapOptions::default());

        let on_click = ctx.props().on_click.clone();
        let click_handler = Closure::<dyn Fn(MouseEvent)>::new(move |event: MouseEvent| {
            let lat_lng = event.lat_lng();
            on_click.emit(Coords(lat_lng.lat(), lat_lng.lng()));
        });
        leaflet_map.on("click", click_handler.as_ref());

        Self {
            map: leaflet_map,
            container,
            markers: HashMap::new(),
            _on_click: click_handler,
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            let props = ctx.props();
            self.map.set_max_zoom(config::MAX_ZOOM);
            self.map.set_view(&lat_lng(props.center), config::MAP_ZOOM);
            add_tile_layer(&self.map);

            let changes = marker_changes([], props.workouts.iter());
            info!(format!("Placing {} markers", changes.len()));
            self.apply(changes, &props.workouts);
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        self.map.invalidate_size(false);
        let props = ctx.props();

        if props.workouts != old_props.workouts {
            let changes = marker_changes(old_props.workouts.iter(), props.workouts.iter());
            self.apply(changes, &props.workouts);
        }

        if props.focus != old_props.focus {
            if let Some(focus) = props.focus {
                if let Err(e) = pan_to(&self.map, focus.coords) {
                    error!(e);
                }
            }
        }

        false
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div class="map">
                {self.render_map()}
            </div>
        }
    }
}

fn lat_lng(coords: Coords) -> LatLng {
    LatLng::new(coords.lat(), coords.lng())
}

/// Animated `setView`, which the bindings only expose without options.
fn pan_to(map: &Map, coords: Coords) -> Result<(), JsValue> {
    let pan = Object::new();
    Reflect::set(&pan, &"duration".into(), &config::PAN_DURATION.into())?;
    let options = Object::new();
    Reflect::set(&options, &"animate".into(), &true.into())?;
    Reflect::set(&options, &"pan".into(), &pan)?;

    let set_view: Function = Reflect::get(map, &"setView".into())?.dyn_into()?;
    set_view.call3(map, &lat_lng(coords).into(), &config::MAP_ZOOM.into(), &options)?;
    Ok(())
}

fn make_marker(workout: &Workout) -> Marker {
    let popup_opts = PopupOptions::default();
    popup_opts.set_max_width(config::POPUP_MAX_WIDTH);
    popup_opts.set_min_width(config::POPUP_MIN_WIDTH);
    popup_opts.set_auto_close(false);
    popup_opts.set_close_on_click(false);
    popup_opts.set_class_name(workout.popup_class());

    let popup = Popup::new(&popup_opts, None);
    popup.set_content(&workout.popup_text().into());

    let marker = Marker::new(&lat_lng(workout.coords));
    marker.bind_popup(&popup);
    marker
}

fn add_tile_layer(map: &Map) {
    let opts = TileLayerOptions::new();
    opts.set_attribution(config::TILE_ATTRIBUTION.to_owned());
    opts.set_update_when_idle(true);
    TileLayer::new_options(config::TILE_URL, &opts).add_to(map);
}
