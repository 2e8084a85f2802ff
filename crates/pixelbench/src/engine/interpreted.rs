use async_trait::async_trait;

use super::{
    check_params, sample_indices, ProcessingEngine, EDGE_THRESHOLD, QUANTIZE_CONVERGENCE,
    QUANTIZE_MAX_ITERATIONS, QUANTIZE_SAMPLE_SIZE,
};
use crate::types::{ImageBuffer, Implementation, ProcessParams, Scenario, CHANNELS};
use crate::Result;

type Rgb = [f64; 3];

const BLUR_KERNEL: [[f64; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
const SOBEL_X: [[f64; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f64; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Reference engine: every channel value is handled as an f64 and stored back clamped
#[derive(Debug, Default, Clone, Copy)]
pub struct InterpretedEngine;

impl InterpretedEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn invert(&self, mut image: ImageBuffer) -> ImageBuffer {
        for px in image.pixels_mut().chunks_exact_mut(CHANNELS) {
            for channel in px.iter_mut().take(3) {
                *channel = store(255.0 - f64::from(*channel));
            }
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

        let blurred = blur(image);
        let out = output.pixels_mut();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let mut gx = 0.0;
                let mut gy = 0.0;
                for ky in 0..3 {
                    for kx in 0..3 {
                        let value = blurred[(y + ky - 1) * width + (x + kx - 1)];
                        gx += value * SOBEL_X[ky][kx];
                        gy += value * SOBEL_Y[ky][kx];
                    }
                }
                let magnitude = (gx * gx + gy * gy).sqrt().round().min(255.0);
                let edge = if magnitude > f64::from(EDGE_THRESHOLD) { 255.0 } else { 0.0 };

                let idx = (y * width + x) * CHANNELS;
                out[idx] = store(edge);
                out[idx + 1] = store(edge);
                out[idx + 2] = store(edge);
                out[idx + 3] = 255;
            }
        }
        output
    }

    pub fn quantize(&self, image: &ImageBuffer, colors: usize) -> ImageBuffer {
        let pixels: Vec<Rgb> = image
            .pixels()
            .chunks_exact(CHANNELS)
            .map(|px| [f64::from(px[0]), f64::from(px[1]), f64::from(px[2])])
            .collect();
        if pixels.is_empty() {
            return image.clone();
        }

        let sample_size = QUANTIZE_SAMPLE_SIZE.min(pixels.len());
        let sample: Vec<Rgb> = sample_indices(pixels.len(), sample_size)
            .map(|i| pixels[i])
            .collect();

        let mut centroids = initial_centroids(&sample, colors);
        for _ in 0..QUANTIZE_MAX_ITERATIONS {
            let mut clusters: Vec<Vec<Rgb>> = vec![Vec::new(); colors];
            for pixel in &sample {
                clusters[nearest(pixel, &centroids)].push(*pixel);
            }
            let next: Vec<Rgb> = clusters
                .iter()
                .zip(&centroids)
                .map(|(cluster, old)| if cluster.is_empty() { *old } else { mean(cluster) })
                .collect();
            let converged = centroids
                .iter()
                .zip(&next)
                .all(|(a, b)| distance(a, b) <= QUANTIZE_CONVERGENCE);
            if converged {
                break;
            }
            centroids = next;
        }

        let mut output = image.clone();
        for (px, pixel) in output.pixels_mut().chunks_exact_mut(CHANNELS).zip(&pixels) {
            let [r, g, b] = centroids[nearest(pixel, &centroids)];
            px[0] = store(r);
            px[1] = store(g);
            px[2] = store(b);
        }
        output
    }
}

#[async_trait]
impl ProcessingEngine for InterpretedEngine {
    fn implementation(&self) -> Implementation {
        Implementation::Interpreted
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

/// Round and clamp into a byte, like a clamped typed-array store
fn store(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Gaussian-blurred grayscale plane; border samples stay zero
fn blur(image: &ImageBuffer) -> Vec<f64> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let data = image.pixels();
    let gray = |x: usize, y: usize| {
        let idx = (y * width + x) * CHANNELS;
        let sum = f64::from(data[idx]) + f64::from(data[idx + 1]) + f64::from(data[idx + 2]);
        (sum / 3.0).round()
    };

    let mut plane = vec![0.0; width * height];
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = 0.0;
            for ky in 0..3 {
                for kx in 0..3 {
                    acc += gray(x + kx - 1, y + ky - 1) * BLUR_KERNEL[ky][kx];
                }
            }
            plane[y * width + x] = f64::from(store(acc / 16.0));
        }
    }
    plane
}

fn distance(a: &Rgb, b: &Rgb) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    (dr * dr + dg * dg + db * db).sqrt()
}

fn nearest(pixel: &Rgb, centroids: &[Rgb]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let d = distance(pixel, centroid);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

fn mean(cluster: &[Rgb]) -> Rgb {
    let len = cluster.len() as f64;
    let sum = cluster.iter().fold([0.0; 3], |acc, p| {
        [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]
    });
    [sum[0] / len, sum[1] / len, sum[2] / len]
}

/// Farthest-point seeding over the sample
fn initial_centroids(sample: &[Rgb], colors: usize) -> Vec<Rgb> {
    let mut centroids = Vec::with_capacity(colors);
    centroids.push(sample[sample.len() / 4]);

    let stride = (sample.len() / 1000).max(1);
    while centroids.len() < colors {
        let mut best = 0;
        let mut best_dist = -1.0;
        for i in (0..sample.len()).step_by(stride) {
            let d = centroids
                .iter()
                .map(|c| distance(&sample[i], c))
                .fold(f64::INFINITY, f64::min);
            if d > best_dist {
                best_dist = d;
                best = i;
            }
        }
        centroids.push(sample[best]);
    }
    centroids
}
