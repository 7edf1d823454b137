use crate::host::{HostEngine, ParticleHandle};
use crate::map::ObjectSpec;
use crate::registry::BuildContext;
use glam::Vec2;
use tw_core::Rect;

/// Particle settings handed to the host when the emitter is created.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmitterConfig {
    pub quantity: u32,
    pub period_ms: u64,
    pub delay_ms: u64,
    pub image: String,
    pub frames: Vec<u32>,
    pub min_speed: Vec2,
    pub max_speed: Vec2,
    pub min_rotation: f32,
    pub max_rotation: f32,
    pub gravity: f32,
}

/// A particle source placed on the map.
///
/// Constrained emitters only emit over the part of their placement that is
/// currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    pub name: String,
    pub config: EmitterConfig,
    pub placement: Rect,
    /// Current emission rectangle.
    pub area: Rect,
    pub constrained: bool,
    pub autostart: bool,
    pub alive: bool,
    handle: ParticleHandle,
}

impl Emitter {
    /// `None` when the detail tier has particle effects switched off.
    pub fn from_spec(ctx: &mut BuildContext<'_>, spec: &ObjectSpec) -> Option<Self> {
        if !ctx.config.detail.particle_effects() {
            log::debug!("Skipping emitter '{}' at {}", spec.name, ctx.config.detail);
            return None;
        }
        let props = &spec.properties;
        let image = props.get_str("image").unwrap_or_default();
        if image.is_empty() {
            log::error!("No image property on emitter '{}'", spec.name);
        }
        let frames = props
            .get_str("frames")
            .unwrap_or_else(|| "0".to_string())
            .split(',')
            .map(|f| f.trim().parse::<u32>().unwrap_or(0))
            .collect();
        let speed = |x: &str, y: &str| {
            Vec2::new(
                props.get_f32(x).unwrap_or(0.0),
                props.get_f32(y).unwrap_or(0.0),
            )
        };
        let config = EmitterConfig {
            quantity: props.get_u32("quantity").unwrap_or(0),
            period_ms: props.get_u64("period").unwrap_or(0),
            delay_ms: props.get_u64("delay").unwrap_or(0),
            image,
            frames,
            min_speed: speed("minParticleSpeedX", "minParticleSpeedY"),
            max_speed: speed("maxParticleSpeedX", "maxParticleSpeedY"),
            min_rotation: props.get_f32("minRotation").unwrap_or(0.0),
            max_rotation: props.get_f32("maxRotation").unwrap_or(0.0),
            gravity: props.get_f32("gravity").unwrap_or(0.0),
        };
        let placement = Rect::new(spec.x, spec.y, spec.width, spec.height);
        let handle = ctx.host.create_particles(&config, placement);
        let mut emitter = Self {
            name: spec.name.clone(),
            config,
            placement,
            area: placement,
            constrained: props.flag("constrained"),
            autostart: props.flag("autostart"),
            alive: true,
            handle,
        };
        if emitter.autostart {
            emitter.go(ctx.host);
        }
        Some(emitter)
    }

    pub fn handle(&self) -> ParticleHandle {
        self.handle
    }

    pub fn update_object(&mut self, host: &mut dyn HostEngine) {
        if !self.constrained {
            return;
        }
        // Off-screen placements keep their last visible rectangle.
        if let Some(visible) = host.camera_view().intersection(&self.placement) {
            self.area = visible;
            host.set_particle_area(self.handle, visible);
        }
    }

    pub fn go(&mut self, host: &mut dyn HostEngine) -> bool {
        host.start_particles(self.handle, self.config.period_ms, self.config.delay_ms);
        self.alive = true;
        true
    }

    pub fn stop(&mut self, host: &mut dyn HostEngine) -> bool {
        self.kill(host);
        true
    }

    pub fn kill(&mut self, host: &mut dyn HostEngine) {
        host.kill_particles(self.handle);
        self.alive = false;
    }

    pub fn revive(&mut self) {
        self.alive = true;
    }

    pub fn reset(&mut self, host: &mut dyn HostEngine) {
        self.kill(host);
        self.area = self.placement;
        if self.autostart {
            self.go(host);
        }
    }

    pub fn call(&mut self, host: &mut dyn HostEngine, method: &str) -> Option<bool> {
        match method {
            "go" => Some(self.go(host)),
            "stop" => Some(self.stop(host)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameworkConfig;
    use crate::host::HeadlessHost;
    use crate::props::PropertyBag;
    use tw_core::DetailTier;

    fn build(config: &FrameworkConfig, host: &mut HeadlessHost, props: PropertyBag) -> Option<Emitter> {
        let mut ctx = BuildContext {
            host,
            config,
            world_size: Vec2::new(2000.0, 1000.0),
            tile_size: Vec2::new(16.0, 16.0),
        };
        let spec = ObjectSpec::new("Emitter", "rain", 0.0, 0.0, 1000.0, 200.0).with_properties(props);
        Emitter::from_spec(&mut ctx, &spec)
    }

    #[test]
    fn low_detail_builds_nothing() {
        let config = FrameworkConfig {
            detail: DetailTier::Low,
            ..FrameworkConfig::default()
        };
        let mut host = HeadlessHost::new(640, 480);
        assert!(build(&config, &mut host, PropertyBag::new().with("image", "drop")).is_none());
        assert!(host.particles.is_empty());
    }

    #[test]
    fn reads_properties_and_autostarts() {
        let config = FrameworkConfig::default();
        let mut host = HeadlessHost::new(640, 480);
        let props = PropertyBag::new()
            .with("image", "drop")
            .with("quantity", "50")
            .with("frames", "0, 2,3")
            .with("maxParticleSpeedY", "300")
            .with("period", 4000)
            .with("autostart", "true");
        let emitter = build(&config, &mut host, props).expect("full detail");
        assert_eq!(emitter.config.quantity, 50);
        assert_eq!(emitter.config.frames, vec![0, 2, 3]);
        assert_eq!(emitter.config.max_speed, Vec2::new(0.0, 300.0));
        assert_eq!(emitter.config.period_ms, 4000);
        assert!(host.particles[0].running);
        assert_eq!(host.particles[0].starts, 1);
    }

    #[test]
    fn constrained_area_tracks_camera() {
        let config = FrameworkConfig::default();
        let mut host = HeadlessHost::new(640, 480);
        let props = PropertyBag::new().with("image", "drop").with("constrained", "true");
        let mut emitter = build(&config, &mut host, props).expect("full detail");
        host.view = Rect::new(800.0, 100.0, 640.0, 480.0);
        emitter.update_object(&mut host);
        assert_eq!(emitter.area, Rect::new(800.0, 100.0, 200.0, 100.0));
        assert_eq!(host.particles[0].area, emitter.area);

        host.view = Rect::new(1500.0, 500.0, 640.0, 480.0);
        emitter.update_object(&mut host);
        assert_eq!(emitter.area, Rect::new(800.0, 100.0, 200.0, 100.0));
    }

    #[test]
    fn go_stop_and_reset() {
        let config = FrameworkConfig::default();
        let mut host = HeadlessHost::new(640, 480);
        let mut emitter = build(&config, &mut host, PropertyBag::new().with("image", "drop"))
            .expect("full detail");
        assert!(!host.particles[0].running);
        assert_eq!(emitter.call(&mut host, "go"), Some(true));
        assert!(host.particles[0].running);
        assert_eq!(emitter.call(&mut host, "stop"), Some(true));
        assert!(!emitter.alive);
        assert_eq!(emitter.call(&mut host, "explode"), None);
        emitter.reset(&mut host);
        assert!(!host.particles[0].running);
    }
}
