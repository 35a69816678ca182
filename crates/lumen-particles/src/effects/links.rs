use crate::curve_buffer::CurveBuffer;
use crate::field::ParticleField;
use crate::pool::EffectPool;
use crate::rand::ParticleRng;
use crate::settings::SimulationSettings;
use lumen_core::curve::perpendicular;
use lumen_core::mesh::icosphere;
use lumen_core::Vec3;
use std::f32::consts::TAU;

const LINK_COLOR: [f32; 3] = [0.45, 0.75, 1.0];

/// Binds one particle to an anchor vertex on the orb
#[derive(Debug, Clone, Copy, Default)]
pub struct Link {
    pub particle: usize,
    pub anchor: usize,
    pub remaining_life: f32,
    /// Offsets the wiggle so links don't move in lockstep
    pub phase: f32,
}

pub struct LinkEffects {
    pool: EffectPool<Link>,
    curves: CurveBuffer,
    anchors: Vec<Vec3>,
    rebound: u64,
}

impl LinkEffects {
    pub fn new(settings: &SimulationSettings, orb_subdivision: u32) -> Self {
        Self {
            pool: EffectPool::new(settings.link_count),
            curves: CurveBuffer::new(settings.link_count, settings.link_segments),
            anchors: orb_anchors(settings.anchor_radius, orb_subdivision),
            rebound: 0,
        }
    }

    /// Rebuild the anchor set for a new orb tessellation. Existing links
    /// are dropped since their anchor indices no longer apply.
    pub fn set_orb_subdivision(&mut self, settings: &SimulationSettings, orb_subdivision: u32) {
        self.anchors = orb_anchors(settings.anchor_radius, orb_subdivision);
        self.reset();
    }

    /// Fill empty slots, age and re-bind links, then rewrite the curves.
    /// Brightness follows `header_weight`.
    pub fn update(
        &mut self,
        dt: f32,
        time: f32,
        header_weight: f32,
        field: &ParticleField,
        rng: &mut ParticleRng,
        settings: &SimulationSettings,
    ) {
        if field.is_empty() || self.anchors.is_empty() {
            self.reset();
            return;
        }

        while let Some((_, link)) = self.pool.claim() {
            *link = bind(field.len(), self.anchors.len(), rng, settings);
        }

        let brightness = header_weight.clamp(0.0, 1.0);
        for slot in 0..self.pool.capacity() {
            let Some(link) = self.pool.get_mut(slot) else {
                continue;
            };
            link.remaining_life -= dt;
            if link.remaining_life <= 0.0 || link.particle >= field.len() {
                *link = bind(field.len(), self.anchors.len(), rng, settings);
                self.rebound += 1;
            }
            let link = *link;

            let start = self.anchors[link.anchor];
            let end = field.position(link.particle);
            let wiggle = settings.link_wiggle
                * (time * settings.link_wiggle_frequency * TAU + link.phase).sin();
            let control = (start + end) * 0.5 + perpendicular(end - start) * wiggle;
            self.curves.write(slot, start, control, end, |t| {
                // Solid at the orb, fading toward the particle
                let alpha = brightness * (1.0 - 0.7 * t);
                [LINK_COLOR[0], LINK_COLOR[1], LINK_COLOR[2], alpha]
            });
        }
    }

    pub fn reset(&mut self) {
        self.pool.clear();
        for slot in 0..self.curves.capacity() {
            self.curves.clear_slot(slot);
        }
    }

    pub fn anchors(&self) -> &[Vec3] {
        &self.anchors
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Link)> {
        self.pool.iter_active()
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn curves(&self) -> &CurveBuffer {
        &self.curves
    }

    /// Links re-bound after expiring
    pub fn rebound(&self) -> u64 {
        self.rebound
    }
}

fn orb_anchors(radius: f32, subdivision: u32) -> Vec<Vec3> {
    icosphere(radius, subdivision)
        .positions
        .iter()
        .map(|p| Vec3::from_array(*p))
        .collect()
}

fn bind(
    particle_count: usize,
    anchor_count: usize,
    rng: &mut ParticleRng,
    settings: &SimulationSettings,
) -> Link {
    Link {
        particle: rng.index(particle_count),
        anchor: rng.index(anchor_count),
        // Stagger lifetimes so links don't all re-bind on the same frame
        remaining_life: settings.link_life * rng.range(0.5, 1.0),
        phase: rng.range(0.0, TAU),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(count: usize) -> ParticleField {
        let mut field = ParticleField::new(count);
        for i in 0..count {
            field.set_position(i, Vec3::new(i as f32, 8.0, 0.0));
        }
        field
    }

    #[test]
    fn anchors_follow_orb_subdivision() {
        let settings = SimulationSettings::default();
        assert_eq!(LinkEffects::new(&settings, 0).anchors().len(), 12);
        let mut links = LinkEffects::new(&settings, 1);
        assert_eq!(links.anchors().len(), 42);
        for a in links.anchors() {
            assert!((a.length() - settings.anchor_radius).abs() < 1e-4);
        }
        links.set_orb_subdivision(&settings, 2);
        assert_eq!(links.anchors().len(), 162);
    }

    #[test]
    fn every_slot_is_bound() {
        let settings = SimulationSettings::default();
        let mut links = LinkEffects::new(&settings, 1);
        let mut rng = ParticleRng::new(5);
        links.update(0.016, 0.0, 1.0, &field(30), &mut rng, &settings);
        assert_eq!(links.live_count(), settings.link_count);
        for (_, link) in links.iter() {
            assert!(link.particle < 30);
            assert!(link.anchor < 42);
        }
    }

    #[test]
    fn expired_links_rebind() {
        let mut settings = SimulationSettings::default();
        settings.link_life = 0.1;
        let mut links = LinkEffects::new(&settings, 1);
        let mut rng = ParticleRng::new(5);
        let field = field(30);
        links.update(0.0, 0.0, 1.0, &field, &mut rng, &settings);
        links.update(0.2, 0.2, 1.0, &field, &mut rng, &settings);
        assert_eq!(links.rebound(), settings.link_count as u64);
        assert_eq!(links.live_count(), settings.link_count);
    }

    #[test]
    fn brightness_tracks_header_weight() {
        let settings = SimulationSettings::default();
        let mut links = LinkEffects::new(&settings, 1);
        let mut rng = ParticleRng::new(5);
        let field = field(30);

        links.update(0.016, 0.0, 0.0, &field, &mut rng, &settings);
        assert!(links.curves().colors().chunks(4).all(|c| c[3] == 0.0));

        links.update(0.016, 0.1, 1.0, &field, &mut rng, &settings);
        assert!((links.curves().slot_colors(0)[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_field_clears_links() {
        let settings = SimulationSettings::default();
        let mut links = LinkEffects::new(&settings, 1);
        let mut rng = ParticleRng::new(5);
        links.update(0.016, 0.0, 1.0, &field(10), &mut rng, &settings);
        links.update(0.016, 0.0, 1.0, &ParticleField::new(0), &mut rng, &settings);
        assert_eq!(links.live_count(), 0);
    }
}
