use crate::cell::Cell;
use crate::error::{PackingError, Result};
use crate::particle::Particle;
use crate::shape::Shape;
use nalgebra::{Matrix3, Vector3};
use std::io::Write;

/// The mutable state of one replica: the periodic cell and the particles in it.
#[derive(Debug, Clone)]
pub struct Configuration {
    cell: Cell,
    particles: Vec<Particle>,
}

impl Configuration {
    pub fn new(cell: Cell, shapes: impl IntoIterator<Item = Shape>) -> Self {
        let particles = shapes
            .into_iter()
            .map(|shape| Particle::new(shape, &cell))
            .collect();
        Self { cell, particles }
    }

    pub fn empty(cell: Cell) -> Self {
        Self {
            cell,
            particles: Vec::new(),
        }
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn n_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn particle(&self, index: usize) -> Result<&Particle> {
        let len = self.particles.len();
        self.particles.get(index).ok_or(PackingError::IndexOutOfRange {
            what: "particle",
            index,
            len,
        })
    }

    pub(crate) fn particle_mut(&mut self, index: usize) -> Result<&mut Particle> {
        let len = self.particles.len();
        self.particles
            .get_mut(index)
            .ok_or(PackingError::IndexOutOfRange {
                what: "particle",
                index,
                len,
            })
    }

    pub(crate) fn push(&mut self, shape: Shape) -> usize {
        self.particles.push(Particle::new(shape, &self.cell));
        self.particles.len() - 1
    }

    /// Total particle volume over cell volume.
    pub fn packing_fraction(&self) -> f64 {
        let occupied: f64 = self.particles.iter().map(|p| p.body().volume()).sum();
        occupied / self.cell.volume()
    }

    /// `true` if particle `index` overlaps any other particle or any periodic
    /// image, including its own.
    pub fn collides(&self, index: usize) -> Result<bool> {
        Ok(self.overlaps_any(index, self.particle(index)?))
    }

    fn overlaps_any(&self, index: usize, particle: &Particle) -> bool {
        self.particles.iter().enumerate().any(|(j, other)| {
            if j == index {
                particle.touches_images_of(other)
            } else {
                particle.touches(other)
            }
        })
    }

    /// Index of the first particle found in an overlap, if any.
    pub fn first_overlap(&self) -> Option<usize> {
        self.particles
            .iter()
            .enumerate()
            .find(|&(i, p)| self.overlaps_any(i, p))
            .map(|(i, _)| i)
    }

    pub fn is_overlap_free(&self) -> bool {
        self.first_overlap().is_none()
    }

    pub(crate) fn restore_particle(&mut self, index: usize, body: Shape) -> Result<()> {
        let cell = &self.cell;
        let len = self.particles.len();
        let particle = self
            .particles
            .get_mut(index)
            .ok_or(PackingError::IndexOutOfRange {
                what: "particle",
                index,
                len,
            })?;
        particle.restore(body, cell);
        Ok(())
    }

    pub(crate) fn wrap_particle(&mut self, index: usize) -> Result<()> {
        let cell = &self.cell;
        let len = self.particles.len();
        self.particles
            .get_mut(index)
            .ok_or(PackingError::IndexOutOfRange {
                what: "particle",
                index,
                len,
            })?
            .wrap(cell)
    }

    /// Wrap every particle into the fundamental cell.
    pub fn wrap_all(&mut self) -> Result<()> {
        let cell = &self.cell;
        self.particles.iter_mut().try_for_each(|p| p.wrap(cell))
    }

    /// Fractional centre-of-mass coordinates of every particle.
    pub fn fractional_coms(&self) -> Result<Vec<Vector3<f64>>> {
        let mut out = Vec::with_capacity(self.particles.len());
        self.fractional_coms_into(&mut out)?;
        Ok(out)
    }

    /// Like [`Configuration::fractional_coms`], reusing the storage of `out`.
    pub fn fractional_coms_into(&self, out: &mut Vec<Vector3<f64>>) -> Result<()> {
        out.clear();
        for p in &self.particles {
            out.push(self.cell.partial_coords(&p.com())?);
        }
        Ok(())
    }

    /// Replace the cell matrix, carrying particles along at fixed fractional
    /// coordinates. Those coordinates are left in `fractional` so the change
    /// can be reverted with [`Configuration::restore_cell`].
    pub(crate) fn set_cell_comoving(
        &mut self,
        h: Matrix3<f64>,
        fractional: &mut Vec<Vector3<f64>>,
    ) -> Result<()> {
        self.fractional_coms_into(fractional)?;
        self.cell.set_h(h);
        self.place_at_fractional(fractional);
        Ok(())
    }

    /// Put back a previous cell matrix and the particles at their recorded
    /// fractional coordinates.
    pub(crate) fn restore_cell(&mut self, h: Matrix3<f64>, fractional: &[Vector3<f64>]) {
        self.cell.set_h(h);
        self.place_at_fractional(fractional);
    }

    fn place_at_fractional(&mut self, fractional: &[Vector3<f64>]) {
        let cell = &self.cell;
        for (particle, s) in self.particles.iter_mut().zip(fractional) {
            let dr = cell.to_absolute(s) - particle.com();
            particle.translate(&dr);
            particle.refresh_images(cell);
        }
    }

    /// Text snapshot: three basis lines, one `particle:` line per body and,
    /// optionally, one `ghost:` line per periodic image.
    pub fn write_snapshot<W: Write>(&self, writer: &mut W, with_ghosts: bool) -> std::io::Result<()> {
        write!(writer, "{}", self.cell)?;
        for particle in &self.particles {
            writeln!(writer, "particle: {}", particle.body())?;
        }
        if with_ghosts {
            for particle in &self.particles {
                for image in particle.images() {
                    writeln!(writer, "ghost: {image}")?;
                }
            }
        }
        Ok(())
    }
}
