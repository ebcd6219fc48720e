//! Convolution of FK tables with PDFs.

use super::error::{Error, Result};
use super::fk_table::FkTable;
use super::flavour_map::FlavourMap;
use super::pids::FLAVOURS;
use super::scalar::{AlignedBuffer, Scalar};
use rayon::prelude::*;

/// A function evaluating the PDFs of replica `replica` at momentum fraction `x` and scale `q`,
/// writing the values for all flavours of the evolution basis (see [`crate::pids`]) into `pdf`.
///
/// Implementations must be pure, since they are called from several threads at once. Any closure
/// with the signature of [`PdfEvaluator::evaluate`] implements this trait.
pub trait PdfEvaluator: Sync {
    /// Writes the PDF values of replica `replica` at `x` and `q` into `pdf`.
    fn evaluate(&self, x: f64, q: f64, replica: usize, pdf: &mut [f64; FLAVOURS]);
}

impl<F> PdfEvaluator for F
where
    F: Fn(f64, f64, usize, &mut [f64; FLAVOURS]) + Sync,
{
    fn evaluate(&self, x: f64, q: f64, replica: usize, pdf: &mut [f64; FLAVOURS]) {
        self(x, q, replica, pdf);
    }
}

impl<T: Scalar> FkTable<T> {
    /// Fills one block of [`FkTable::row_size`] elements per replica with the PDFs at the x grid
    /// of this table, in the layout of a datapoint row. Padding elements are zero.
    fn pdf_cache(&self, pdf: &impl PdfEvaluator, nreplicas: usize) -> Result<AlignedBuffer<T>> {
        let row_size = self.row_size();
        let len = row_size.checked_mul(nreplicas).ok_or_else(|| {
            Error::Range(format!("PDF cache for {nreplicas} replicas exceeds the address space"))
        })?;
        let mut cache = AlignedBuffer::new(len)?;

        let nx = self.nx();
        let tx = self.tx();
        let q = self.q20().sqrt();

        cache
            .par_chunks_mut(row_size)
            .enumerate()
            .for_each(|(replica, block)| {
                let mut values = vec![[0.0; FLAVOURS]; nx];

                for (&x, values) in self.x_grid().iter().zip(&mut values) {
                    pdf.evaluate(x, q, replica, values);
                }

                match self.flavour_map() {
                    FlavourMap::Hadronic(pairs) => {
                        for (&(fl1, fl2), block) in pairs.iter().zip(block.chunks_exact_mut(tx)) {
                            for (xfx1, block) in values.iter().zip(block.chunks_exact_mut(nx)) {
                                for (xfx2, entry) in values.iter().zip(block) {
                                    *entry = T::from_f64(xfx1[fl1] * xfx2[fl2]);
                                }
                            }
                        }
                    }
                    FlavourMap::Dis(flavours) => {
                        for (&fl, block) in flavours.iter().zip(block.chunks_exact_mut(tx)) {
                            for (xfx, entry) in values.iter().zip(block) {
                                *entry = T::from_f64(xfx[fl]);
                            }
                        }
                    }
                }
            });

        Ok(cache)
    }

    /// Convolves this table with `nreplicas` replicas of `pdf`. The prediction for datapoint `d`
    /// and replica `n` is written into `out[d * nreplicas + n]`.
    ///
    /// Datapoints are processed in parallel on the current `rayon` thread pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if `out` doesn't have `ndata * nreplicas` elements or if the PDF
    /// cache can not be allocated.
    pub fn convolve(&self, pdf: &impl PdfEvaluator, nreplicas: usize, out: &mut [T]) -> Result<()> {
        if Some(out.len()) != self.ndata().checked_mul(nreplicas) {
            return Err(Error::Range(format!(
                "output buffer has {} elements, expected {} datapoints times {nreplicas} replicas",
                out.len(),
                self.ndata()
            )));
        }

        if nreplicas == 0 {
            return Ok(());
        }

        let cache = self.pdf_cache(pdf, nreplicas)?;
        let row_size = self.row_size();

        out.par_chunks_mut(nreplicas)
            .zip(self.sigma().par_chunks_exact(row_size))
            .for_each(|(out, sigma)| {
                for (result, cached) in out.iter_mut().zip(cache.chunks_exact(row_size)) {
                    *result = T::dot(cached, sigma);
                }
            });

        Ok(())
    }

    /// Like [`FkTable::convolve`], but allocates and returns the output buffer.
    ///
    /// # Errors
    ///
    /// See [`FkTable::convolve`].
    pub fn convolve_to_vec(&self, pdf: &impl PdfEvaluator, nreplicas: usize) -> Result<Vec<T>> {
        let mut out = vec![T::default(); self.ndata() * nreplicas];
        self.convolve(pdf, nreplicas, &mut out)?;

        Ok(out)
    }
}
