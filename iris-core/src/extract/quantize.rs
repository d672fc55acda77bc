//! k-means colour quantization in RGB space.
//!
//! Clustering runs on `Srgb<f32>` samples through `kmeans_colors` with a
//! fixed seed, so identical input always yields identical clusters.

use kmeans_colors::get_kmeans;
use palette::Srgb;
use tracing::debug;

use crate::color::Rgb8;
use crate::error::{PaletteError, Result};

/// Seed for centroid initialization.
pub const KMEANS_SEED: u64 = 42;

/// Iteration cap for a single k-means run.
pub const KMEANS_MAX_ITERATIONS: usize = 300;

/// Convergence threshold on centroid movement.
pub const KMEANS_CONVERGENCE: f32 = 1e-4;

/// One representative colour and the number of samples assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster {
    pub color: Rgb8,
    pub population: usize,
}

fn to_rgb8(centroid: &Srgb<f32>) -> Rgb8 {
    let channel = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb8::new(
        channel(centroid.red),
        channel(centroid.green),
        channel(centroid.blue),
    )
}

/// Cluster `pixels` into exactly `n_colors` colours, most populous first.
///
/// Ties keep the order in which k-means produced the clusters. A cluster
/// that ends up with no samples keeps its slot and takes the colour of the
/// most populous cluster.
pub fn quantize(pixels: &[Rgb8], n_colors: usize) -> Result<Vec<Cluster>> {
    if pixels.is_empty() {
        return Err(PaletteError::DecodeError("image has no pixels".into()));
    }
    if n_colors == 0 {
        return Err(PaletteError::Internal("cluster count must be positive".into()));
    }

    let samples: Vec<Srgb<f32>> = pixels
        .iter()
        .map(|p| Srgb::<u8>::new(p.r, p.g, p.b).into_format::<f32>())
        .collect();

    let kmeans = get_kmeans(
        n_colors,
        KMEANS_MAX_ITERATIONS,
        KMEANS_CONVERGENCE,
        false,
        &samples,
        KMEANS_SEED,
    );

    // k-means++ seeding stops early once every distinct colour is a centroid
    let found = kmeans.centroids.len();
    if found == 0 || found > n_colors {
        return Err(PaletteError::Internal(format!(
            "k-means returned {found} centroids, expected {n_colors}"
        )));
    }

    let mut populations = vec![0usize; found];
    for &label in &kmeans.indices {
        if let Some(count) = populations.get_mut(label as usize) {
            *count += 1;
        }
    }

    let mut clusters: Vec<Cluster> = kmeans
        .centroids
        .iter()
        .zip(populations)
        .map(|(centroid, population)| Cluster {
            color: to_rgb8(centroid),
            population,
        })
        .collect();

    // Stable: equal populations stay in cluster-index order
    clusters.sort_by(|a, b| b.population.cmp(&a.population));

    let dominant = clusters[0].color;
    for cluster in clusters.iter_mut().filter(|c| c.population == 0) {
        cluster.color = dominant;
    }
    clusters.resize(
        n_colors,
        Cluster {
            color: dominant,
            population: 0,
        },
    );

    debug!(
        samples = pixels.len(),
        n_colors,
        centroids = found,
        score = kmeans.score,
        "k-means converged"
    );

    Ok(clusters)
}
