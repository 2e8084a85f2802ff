use async_trait::async_trait;

use super::{
    check_params, sample_indices, ProcessingEngine, EDGE_THRESHOLD, QUANTIZE_CONVERGENCE,
    QUANTIZE_MAX_ITERATIONS, QUANTIZE_SAMPLE_SIZE,
};
use crate::types::{ImageBuffer, Implementation, ProcessParams, Scenario, CHANNELS};
use crate::Result;

/// Largest squared Sobel magnitude whose rounded root is still <= EDGE_THRESHOLD.
/// round(sqrt(m)) > 170  <=>  sqrt(m) >= 170.5  <=>  m >= 29070.25
const EDGE_THRESHOLD_SQ: i32 = {
    let half = EDGE_THRESHOLD as i32 * 2 + 1;
    (half * half) / 4
};

/// Optimized engine built from integer kernels and precomputed tables
#[derive(Debug, Clone)]
pub struct CompiledEngine {
    /// `255 - v`
    invert_lut: [u8; 256],
    /// `round(sum / 3)` for channel sums 0..=765
    gray_lut: Vec<u8>,
}

impl CompiledEngine {
    /// Build the lookup tables
    pub fn load() -> Result<Self> {
        let mut invert_lut = [0u8; 256];
        for (v, slot) in invert_lut.iter_mut().enumerate() {
            *slot = 255 - v as u8;
        }
        // Thirds never land on .5, so (s + 1) / 3 is round(s / 3)
        let gray_lut = (0..=765u16).map(|s| ((s + 1) / 3) as u8).collect();
        Ok(Self {
            invert_lut,
            gray_lut,
        })
    }

    pub fn invert(&self, mut image: ImageBuffer) -> ImageBuffer {
        let lut = &self.invert_lut;
        for px in image.pixels_mut().chunks_exact_mut(CHANNELS) {
            px[0] = lut[px[0] as usize];
            px[1] = lut[px[1] as usize];
            px[2] = lut[px[2] as usize];
        }
        image
    }

    pub fn edge_detect(&self, image: &ImageBuffer) -> ImageBuffer {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let mut output = ImageBuffer::blank(image.width(), image.height());
        if width < 3 || height < 3 {
            return output;
        }

        let gray: Vec<i32> = image
            .pixels()
            .chunks_exact(CHANNELS)
            .map(|px| {
                let sum = px[0] as usize + px[1] as usize + px[2] as usize;
                self.gray_lut[sum] as i32
            })
            .collect();

        let mut blurred = vec![0i32; width * height];
        for y in 1..height - 1 {
            let up = &gray[(y - 1) * width..y * width];
            let mid = &gray[y * width..(y + 1) * width];
            let down = &gray[(y + 1) * width..(y + 2) * width];
            for x in 1..width - 1 {
                let acc = up[x - 1] + 2 * up[x] + up[x + 1]
                    + 2 * mid[x - 1] + 4 * mid[x] + 2 * mid[x + 1]
                    + down[x - 1] + 2 * down[x] + down[x + 1];
                blurred[y * width + x] = (acc + 8) >> 4;
            }
        }

        let out = output.pixels_mut();
        for y in 1..height - 1 {
            let up = &blurred[(y - 1) * width..y * width];
            let mid = &blurred[y * width..(y + 1) * width];
            let down = &blurred[(y + 1) * width..(y + 2) * width];
            for x in 1..width - 1 {
                let gx = (up[x + 1] + 2 * mid[x + 1] + down[x + 1])
                    - (up[x - 1] + 2 * mid[x - 1] + down[x - 1]);
                let gy = (down[x - 1] + 2 * down[x] + down[x + 1])
                    - (up[x - 1] + 2 * up[x] + up[x + 1]);
                let edge = if gx * gx + gy * gy > EDGE_THRESHOLD_SQ { 255 } else { 0 };

                let idx = (y * width + x) * CHANNELS;
                out[idx..idx + CHANNELS].copy_from_slice(&[edge, edge, edge, 255]);
            }
        }
        output
    }

    pub fn quantize(&self, image: &ImageBuffer, colors: usize) -> ImageBuffer {
        let count = image.pixel_count();
        if count == 0 {
            return image.clone();
        }
        let data = image.pixels();
        let rgb_at = |i: usize| {
            let idx = i * CHANNELS;
            [data[idx] as f64, data[idx + 1] as f64, data[idx + 2] as f64]
        };

        let sample_size = QUANTIZE_SAMPLE_SIZE.min(count);
        let sample: Vec<[f64; 3]> = sample_indices(count, sample_size).map(rgb_at).collect();

        let mut centroids = seed(&sample, colors);
        let mut sums = vec![[0.0f64; 3]; colors];
        let mut counts = vec![0usize; colors];
        let limit_sq = QUANTIZE_CONVERGENCE * QUANTIZE_CONVERGENCE;
        for _ in 0..QUANTIZE_MAX_ITERATIONS {
            sums.iter_mut().for_each(|s| *s = [0.0; 3]);
            counts.iter_mut().for_each(|c| *c = 0);
            for p in &sample {
                let k = nearest_sq(p, &centroids);
                sums[k][0] += p[0];
                sums[k][1] += p[1];
                sums[k][2] += p[2];
                counts[k] += 1;
            }

            let mut converged = true;
            let mut next = centroids.clone();
            for k in 0..colors {
                if counts[k] > 0 {
                    let n = counts[k] as f64;
                    next[k] = [sums[k][0] / n, sums[k][1] / n, sums[k][2] / n];
                }
                if dist_sq(&centroids[k], &next[k]) > limit_sq {
                    converged = false;
                }
            }
            if converged {
                break;
            }
            centroids = next;
        }

        let palette: Vec<[u8; 3]> = centroids
            .iter()
            .map(|c| [c[0].round() as u8, c[1].round() as u8, c[2].round() as u8])
            .collect();

        let mut output = image.clone();
        // Runs of identical colors are common; reuse the previous lookup
        let mut last: Option<([u8; 3], usize)> = None;
        for px in output.pixels_mut().chunks_exact_mut(CHANNELS) {
            let key = [px[0], px[1], px[2]];
            let k = match last {
                Some((prev, k)) if prev == key => k,
                _ => {
                    let k = nearest_sq(&[key[0] as f64, key[1] as f64, key[2] as f64], &centroids);
                    last = Some((key, k));
                    k
                }
            };
            px[..3].copy_from_slice(&palette[k]);
        }
        output
    }
}

#[async_trait]
impl ProcessingEngine for CompiledEngine {
    fn implementation(&self) -> Implementation {
        Implementation::Compiled
    }

    async fn process(
        &self,
        scenario: Scenario,
        input: ImageBuffer,
        params: &ProcessParams,
    ) -> Result<ImageBuffer> {
        check_params(scenario, params)?;
        Ok(match scenario {
            Scenario::Invert => self.invert(input),
            Scenario::EdgeDetect => self.edge_detect(&input),
            Scenario::Quantize => self.quantize(&input, params.quantize_colors),
        })
    }
}

#[inline]
fn dist_sq(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

#[inline]
fn nearest_sq(p: &[f64; 3], centroids: &[[f64; 3]]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (k, c) in centroids.iter().enumerate() {
        let d = dist_sq(p, c);
        if d < best_d {
            best_d = d;
            best = k;
        }
    }
    best
}

fn seed(sample: &[[f64; 3]], colors: usize) -> Vec<[f64; 3]> {
    let mut centroids = Vec::with_capacity(colors);
    centroids.push(sample[sample.len() / 4]);
    // Distance to the closest chosen centroid, updated incrementally
    let stride = (sample.len() / 1000).max(1);
    let mut closest: Vec<f64> = (0..sample.len())
        .step_by(stride)
        .map(|i| dist_sq(&sample[i], &centroids[0]))
        .collect();

    while centroids.len() < colors {
        let mut best = 0;
        let mut best_d = -1.0;
        for (slot, &d) in closest.iter().enumerate() {
            if d > best_d {
                best_d = d;
                best = slot * stride;
            }
        }
        let chosen = sample[best];
        centroids.push(chosen);
        for (slot, d) in closest.iter_mut().enumerate() {
            let candidate = dist_sq(&sample[slot * stride], &chosen);
            if candidate < *d {
                *d = candidate;
            }
        }
    }
    centroids
}
