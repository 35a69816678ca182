use crate::curve_buffer::CurveBuffer;
use crate::field::ParticleField;
use crate::pool::EffectPool;
use crate::rand::ParticleRng;
use crate::settings::SimulationSettings;
use lumen_core::curve::perpendicular;
use lumen_core::Vec3;

const CHORD_COLOR: [f32; 3] = [1.0, 0.82, 0.55];
const FLASH_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// An elastic string between two particles on opposite sides of the field
#[derive(Debug, Clone, Copy, Default)]
pub struct Chord {
    pub a: usize,
    pub b: usize,
    /// Fixed at spawn; tension is measured against it
    pub rest_length: f32,
    pub remaining_life: f32,
    /// Which side of the chord the bulge goes to, +1 or -1
    pub bend: f32,
}

impl Chord {
    /// Relative stretch beyond rest, never negative
    pub fn tension(&self, distance: f32) -> f32 {
        ((distance - self.rest_length) / self.rest_length).max(0.0)
    }
}

/// Saturating map from tension to [0, 1), strictly increasing
fn saturate(tension: f32) -> f32 {
    let t = tension.max(0.0);
    t / (1.0 + t)
}

/// Vertex brightness of a chord under `tension`
pub fn chord_brightness(tension: f32, settings: &SimulationSettings) -> f32 {
    settings.chord_brightness + settings.chord_brightness_gain * saturate(tension)
}

/// Lateral control-point offset of a chord under `tension`
pub fn chord_bulge(rest_length: f32, tension: f32, settings: &SimulationSettings) -> f32 {
    rest_length * (settings.chord_bulge + settings.chord_bulge_gain * saturate(tension))
}

pub struct ChordEffects {
    pool: EffectPool<Chord>,
    curves: CurveBuffer,
    spawned: u64,
    skipped: u64,
    snaps: u64,
}

impl ChordEffects {
    pub fn new(settings: &SimulationSettings) -> Self {
        Self {
            pool: EffectPool::new(settings.chord_capacity),
            curves: CurveBuffer::new(settings.chord_capacity, settings.chord_segments),
            spawned: 0,
            skipped: 0,
            snaps: 0,
        }
    }

    /// Pick a random particle and a partner roughly half the field away
    pub fn spawn(
        &mut self,
        field: &ParticleField,
        rng: &mut ParticleRng,
        settings: &SimulationSettings,
    ) -> Option<usize> {
        let count = field.len();
        if count < 2 {
            self.skipped += 1;
            return None;
        }
        let a = rng.index(count);
        let offset = (rng.range(0.45, 0.55) * count as f32).round() as usize;
        let b = (a + offset) % count;
        if a == b {
            self.skipped += 1;
            return None;
        }
        let bend = if rng.chance(0.5) { 1.0 } else { -1.0 };
        self.spawn_between(a, b, bend, field, settings)
    }

    /// Claim a slot for a chord between `a` and `b`, resting at their current distance
    pub fn spawn_between(
        &mut self,
        a: usize,
        b: usize,
        bend: f32,
        field: &ParticleField,
        settings: &SimulationSettings,
    ) -> Option<usize> {
        let distance = field.position(a).distance(field.position(b));
        let Some((slot, chord)) = self.pool.claim() else {
            self.skipped += 1;
            return None;
        };
        *chord = Chord {
            a,
            b,
            rest_length: distance.max(settings.chord_min_rest).min(settings.chord_max_rest),
            remaining_life: settings.chord_life,
            bend,
        };
        self.spawned += 1;
        Some(slot)
    }

    /// Age, tension and snap every live chord. Returns the number that
    /// snapped during this call.
    ///
    /// A snapping chord is drawn once with the flash color and released in
    /// the same call; its curve is collapsed on the next one.
    pub fn update(&mut self, dt: f32, field: &ParticleField, settings: &SimulationSettings) -> usize {
        let mut snapped = 0;
        for slot in 0..self.pool.capacity() {
            let Some(mut chord) = self.pool.get(slot).copied() else {
                if self.curves.is_drawn(slot) {
                    self.curves.clear_slot(slot);
                }
                continue;
            };

            chord.remaining_life -= dt;
            if chord.remaining_life <= 0.0 || chord.a >= field.len() || chord.b >= field.len() {
                self.pool.release(slot);
                self.curves.clear_slot(slot);
                continue;
            }
            if let Some(live) = self.pool.get_mut(slot) {
                live.remaining_life = chord.remaining_life;
            }

            let start = field.position(chord.a);
            let end = field.position(chord.b);
            let distance = start.distance(end);
            let midpoint = (start + end) * 0.5;
            let side = perpendicular(end - start) * chord.bend;

            if distance > settings.snap_stretch * chord.rest_length + settings.snap_slack {
                let flash = settings.snap_flash;
                self.curves.write(slot, start, midpoint, end, |_| {
                    [FLASH_COLOR[0], FLASH_COLOR[1], FLASH_COLOR[2], flash]
                });
                self.pool.release(slot);
                self.snaps += 1;
                snapped += 1;
                log::trace!("Chord {slot} snapped at {distance:.2} (rest {:.2})", chord.rest_length);
                continue;
            }

            let tension = chord.tension(distance);
            let control = midpoint + side * chord_bulge(chord.rest_length, tension, settings);
            let brightness = chord_brightness(tension, settings);
            self.curves.write(slot, start, control, end, |t| {
                // Fade toward the endpoints
                let edge = 1.0 - (2.0 * t - 1.0).abs();
                let alpha = brightness * (0.35 + 0.65 * edge);
                [CHORD_COLOR[0], CHORD_COLOR[1], CHORD_COLOR[2], alpha]
            });
        }
        snapped
    }

    pub fn reset(&mut self) {
        self.pool.clear();
        for slot in 0..self.curves.capacity() {
            self.curves.clear_slot(slot);
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Chord> {
        self.pool.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Chord)> {
        self.pool.iter_active()
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn curves(&self) -> &CurveBuffer {
        &self.curves
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Total snaps since creation
    pub fn snaps(&self) -> u64 {
        self.snaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_at(distance: f32) -> ParticleField {
        let mut field = ParticleField::new(2);
        field.set_position(1, Vec3::new(distance, 0.0, 0.0));
        field
    }

    #[test]
    fn rest_length_is_clamped_and_fixed() {
        let settings = SimulationSettings::default();
        let mut chords = ChordEffects::new(&settings);

        let mut field = pair_at(0.5);
        let slot = chords.spawn_between(0, 1, 1.0, &field, &settings).unwrap();
        assert!((chords.get(slot).unwrap().rest_length - settings.chord_min_rest).abs() < 1e-6);

        field.set_position(1, Vec3::new(2.5, 0.0, 0.0));
        chords.update(0.016, &field, &settings);
        assert!((chords.get(slot).unwrap().rest_length - settings.chord_min_rest).abs() < 1e-6);

        let far = pair_at(40.0);
        let mut other = ChordEffects::new(&settings);
        let slot = other.spawn_between(0, 1, 1.0, &far, &settings).unwrap();
        assert!((other.get(slot).unwrap().rest_length - settings.chord_max_rest).abs() < 1e-6);
    }

    #[test]
    fn chord_snaps_just_past_the_limit() {
        let settings = SimulationSettings::default();
        let mut chords = ChordEffects::new(&settings);
        let mut field = pair_at(10.0);
        let slot = chords.spawn_between(0, 1, 1.0, &field, &settings).unwrap();

        field.set_position(1, Vec3::new(17.59, 0.0, 0.0));
        assert_eq!(chords.update(0.016, &field, &settings), 0);
        assert!(chords.get(slot).is_some());

        field.set_position(1, Vec3::new(17.62, 0.0, 0.0));
        assert_eq!(chords.update(0.016, &field, &settings), 1);
        assert!(chords.get(slot).is_none());
        assert_eq!(chords.live_count(), 0);
        assert_eq!(chords.snaps(), 1);

        // The flash frame is still in the buffer, then collapses
        assert!(chords.curves().is_drawn(slot));
        assert!((chords.curves().slot_colors(slot)[3] - settings.snap_flash).abs() < 1e-6);
        chords.update(0.016, &field, &settings);
        assert!(!chords.curves().is_drawn(slot));
    }

    #[test]
    fn chord_at_exactly_the_limit_survives() {
        let settings = SimulationSettings::default();
        let mut chords = ChordEffects::new(&settings);
        let mut field = pair_at(10.0);
        let slot = chords.spawn_between(0, 1, 1.0, &field, &settings).unwrap();

        field.set_position(1, Vec3::new(17.6, 0.0, 0.0));
        assert_eq!(chords.update(0.016, &field, &settings), 0);
        assert!(chords.get(slot).is_some());
    }

    #[test]
    fn slack_is_added_to_every_rest_length() {
        let settings = SimulationSettings::default();
        let mut chords = ChordEffects::new(&settings);
        let mut field = pair_at(2.0);
        let slot = chords.spawn_between(0, 1, 1.0, &field, &settings).unwrap();

        // Past stretch * rest (3.5) but inside the slack
        field.set_position(1, Vec3::new(3.55, 0.0, 0.0));
        assert_eq!(chords.update(0.016, &field, &settings), 0);
        assert!(chords.get(slot).is_some());

        field.set_position(1, Vec3::new(3.65, 0.0, 0.0));
        assert_eq!(chords.update(0.016, &field, &settings), 1);
    }

    #[test]
    fn chords_expire() {
        let mut settings = SimulationSettings::default();
        settings.chord_life = 0.05;
        let mut chords = ChordEffects::new(&settings);
        let field = pair_at(5.0);
        chords.spawn_between(0, 1, -1.0, &field, &settings).unwrap();

        chords.update(0.03, &field, &settings);
        assert_eq!(chords.live_count(), 1);
        chords.update(0.03, &field, &settings);
        assert_eq!(chords.live_count(), 0);
        assert_eq!(chords.snaps(), 0);
    }

    #[test]
    fn bulge_and_brightness_grow_with_tension() {
        let settings = SimulationSettings::default();
        let mut prev_b = chord_brightness(0.0, &settings);
        let mut prev_g = chord_bulge(10.0, 0.0, &settings);
        for k in 1..50 {
            let tension = k as f32 * 0.05;
            let b = chord_brightness(tension, &settings);
            let g = chord_bulge(10.0, tension, &settings);
            assert!(b > prev_b);
            assert!(g > prev_g);
            prev_b = b;
            prev_g = g;
        }
    }

    #[test]
    fn slack_chord_has_zero_tension() {
        let chord = Chord {
            rest_length: 10.0,
            ..Default::default()
        };
        assert_eq!(chord.tension(4.0), 0.0);
        assert!((chord.tension(15.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn random_partner_is_about_half_the_field_away() {
        let settings = SimulationSettings::default();
        let mut chords = ChordEffects::new(&settings);
        let field = ParticleField::new(100);
        let mut rng = ParticleRng::new(21);
        for _ in 0..20 {
            chords.spawn(&field, &mut rng, &settings);
        }
        for (_, chord) in chords.iter() {
            let gap = (chord.b + 100 - chord.a) % 100;
            assert!((45..=55).contains(&gap), "gap {gap}");
        }
        assert_eq!(chords.live_count(), 20);
    }
}
