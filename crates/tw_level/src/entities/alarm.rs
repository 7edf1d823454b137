use super::{Frame, Link};
use crate::map::ObjectSpec;
use crate::sprite::CallArgs;

/// A countdown that calls a method on its target once the period elapses.
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    pub name: String,
    pub period_ms: u64,
    pub repeating: bool,
    /// Method to call; `alarm` when unset.
    pub call: Option<String>,
    pub target: Link,
    pub started: bool,
    pub start_time: u64,
}

impl Alarm {
    pub fn from_spec(spec: &ObjectSpec) -> Self {
        let props = &spec.properties;
        Self {
            name: spec.name.clone(),
            period_ms: props.get_u64("period").unwrap_or(0),
            repeating: props.flag("repeating"),
            call: props.get_str("call"),
            target: Link::target(props.get_str("target")),
            started: false,
            start_time: 0,
        }
    }

    /// Start counting from `now_ms`. Has no effect on a running alarm.
    pub fn start(&mut self, now_ms: u64) {
        if !self.started {
            self.started = true;
            self.start_time = now_ms;
        }
    }

    pub fn reset(&mut self) {
        self.started = false;
        self.start_time = 0;
    }

    pub fn update_object(&mut self, frame: &mut Frame<'_>) {
        let target = self.target.resolve(frame.world);
        if !self.started || frame.now_ms.saturating_sub(self.start_time) < self.period_ms {
            return;
        }

        if let Some(target) = target {
            let method = self.call.as_deref().unwrap_or("alarm");
            let args = CallArgs::from_caller(&self.name);
            if frame
                .world
                .call(&mut *frame.host, target, method, &args)
                .is_none()
            {
                log::debug!("Alarm '{}' target has no method '{}'", self.name, method);
            }
        }

        if self.repeating {
            self.start_time = frame.now_ms;
        } else {
            self.started = false;
        }
    }
}
