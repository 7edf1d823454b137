use super::{Frame, Link};
use crate::map::ObjectSpec;
use crate::sprite::CallArgs;
use tw_core::Rect;

/// A region that reports its tracked entity entering and leaving.
///
/// Callbacks are edge-triggered: `on_enter` fires on the first overlapping
/// update, `on_exit` on the first non-overlapping update after that.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub name: String,
    pub bounds: Rect,
    pub entity: Link,
    pub target: Link,
    pub on_enter: Option<String>,
    pub on_exit: Option<String>,
    pub entity_inside: bool,
}

impl Area {
    pub fn from_spec(spec: &ObjectSpec) -> Self {
        let props = &spec.properties;
        let width = if spec.width > 0.0 { spec.width } else { 1.0 };
        let height = if spec.height > 0.0 { spec.height } else { 1.0 };
        Self {
            name: spec.name.clone(),
            bounds: Rect::new(spec.x, spec.y, width, height),
            entity: Link::entity(props.get_str("entity")),
            target: Link::target(props.get_str("target")),
            on_enter: props.get_str("on_enter"),
            on_exit: props.get_str("on_exit"),
            entity_inside: false,
        }
    }

    pub fn reset(&mut self) {
        self.entity_inside = false;
    }

    pub fn update_object(&mut self, frame: &mut Frame<'_>) {
        let target = self.target.resolve(frame.world);
        let Some(entity) = self.entity.resolve(frame.world) else {
            return;
        };
        let Some(entity_bounds) = frame.world.bounds(entity) else {
            return;
        };
        let collide = self.bounds.intersects(&entity_bounds);

        let callback = if collide && !self.entity_inside {
            self.entity_inside = true;
            self.on_enter.as_deref()
        } else if !collide && self.entity_inside {
            self.entity_inside = false;
            self.on_exit.as_deref()
        } else {
            None
        };

        if let (Some(method), Some(target)) = (callback, target) {
            let args = CallArgs {
                caller: self.name.clone(),
                entity: Some(entity),
            };
            frame.world.call(&mut *frame.host, target, method, &args);
        }
    }
}
