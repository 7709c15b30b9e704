use argh::FromArgs;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{DVec2, DVec3};
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use stvo_features::{
    DetectionRequest, Detections, Descriptors, FeatureDetector, FeatureError, GrayImage,
    ImageSize, KeyLine, KeyPoint,
};
use stvo_geometry::{PinholeStereoCamera, StereoCamera};
use stvo_stereo::{ExtractionSummary, StereoConfig, StereoError, StereoFrame, StereoPipeline};

const LEFT_MARKER: u8 = 0;
const RIGHT_MARKER: u8 = 255;
const DESCRIPTOR_BYTES: usize = 32;

#[derive(FromArgs)]
/// Extract stereo point and line features from a synthetic scene
struct Args {
    /// number of 3D points in the scene
    #[argh(option, short = 'n', default = "200")]
    num_points: usize,

    /// number of 3D segments in the scene
    #[argh(option, short = 'l', default = "30")]
    num_lines: usize,

    /// number of frames, the camera moves forward between frames
    #[argh(option, short = 'f', default = "3")]
    num_frames: usize,

    /// random seed
    #[argh(option, default = "42")]
    seed: u64,

    /// number of descriptor bits flipped between the left and right view
    #[argh(option, default = "32")]
    noise_bits: usize,

    /// override of the point ratio threshold `min_ratio_12_p`
    #[argh(option)]
    min_ratio: Option<f64>,

    /// path to a JSON pipeline configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,
}

/// Scene elements with their left and right descriptors.
type ScenePoint = (DVec3, [u8; DESCRIPTOR_BYTES], [u8; DESCRIPTOR_BYTES]);
type SceneLine = (DVec3, DVec3, [u8; DESCRIPTOR_BYTES], [u8; DESCRIPTOR_BYTES]);

/// Binary descriptor of a scene element, plus a copy for the right view with
/// exactly `noise_bits` distinct bits flipped.
///
/// The point ratio test keeps `best / second > min_ratio_12_p`, so right
/// descriptors closer than about a tenth of the random descriptor distance
/// (~128 bits) are rejected under the default configuration.
fn descriptor_pair(
    rng: &mut StdRng,
    noise_bits: usize,
) -> ([u8; DESCRIPTOR_BYTES], [u8; DESCRIPTOR_BYTES]) {
    let left: [u8; DESCRIPTOR_BYTES] = std::array::from_fn(|_| rng.random::<u8>());
    let mut right = left;
    let total_bits = DESCRIPTOR_BYTES * 8;
    for bit in index::sample(rng, total_bits, noise_bits.min(total_bits)) {
        right[bit / 8] ^= 1u8 << (bit % 8);
    }
    (left, right)
}

fn random_point(rng: &mut StdRng) -> DVec3 {
    DVec3::new(
        rng.random_range(-3.0..3.0),
        rng.random_range(-2.0..2.0),
        rng.random_range(2.0..12.0),
    )
}

/// A detector returning the projections of a known scene.
struct SceneDetector {
    left: Detections,
    right: Detections,
}

impl SceneDetector {
    fn new(
        camera: &dyn StereoCamera,
        points: &[ScenePoint],
        lines: &[SceneLine],
        offset: DVec3,
    ) -> Result<Self, FeatureError> {
        let mut left = Detections {
            point_descriptors: Descriptors::empty(DESCRIPTOR_BYTES),
            line_descriptors: Descriptors::empty(DESCRIPTOR_BYTES),
            ..Default::default()
        };
        let mut right = left.clone();

        let in_image = |p: DVec2| {
            p.x >= 0.0 && p.y >= 0.0 && p.x < camera.width() as f64 && p.y < camera.height() as f64
        };
        let stereo_view = |p: DVec3| {
            let p = p - offset;
            if p.z <= 0.0 {
                return None;
            }
            let (pixel, disparity) = camera.project(p);
            let right_pixel = pixel - DVec2::new(disparity, 0.0);
            (in_image(pixel) && in_image(right_pixel)).then_some((pixel, right_pixel))
        };

        for (p, desc_l, desc_r) in points {
            if let Some((pl, pr)) = stereo_view(*p) {
                left.points.push(KeyPoint::new(pl.x, pl.y));
                left.point_descriptors.push_row(desc_l)?;
                right.points.push(KeyPoint::new(pr.x, pr.y));
                right.point_descriptors.push_row(desc_r)?;
            }
        }

        for (start, end, desc_l, desc_r) in lines {
            if let (Some((sl, sr)), Some((el, er))) = (stereo_view(*start), stereo_view(*end)) {
                left.lines.push(KeyLine::new(sl, el));
                left.line_descriptors.push_row(desc_l)?;
                right.lines.push(KeyLine::new(sr, er));
                right.line_descriptors.push_row(desc_r)?;
            }
        }

        Ok(Self { left, right })
    }
}

impl FeatureDetector for SceneDetector {
    fn detect(
        &self,
        image: &GrayImage,
        request: &DetectionRequest,
    ) -> Result<Detections, FeatureError> {
        let source = match image.as_slice().first().copied() {
            Some(LEFT_MARKER) => &self.left,
            Some(RIGHT_MARKER) => &self.right,
            _ => return Err(FeatureError::Detector("unknown view".to_string())),
        };

        let mut out = Detections {
            point_descriptors: Descriptors::empty(DESCRIPTOR_BYTES),
            line_descriptors: Descriptors::empty(DESCRIPTOR_BYTES),
            ..Default::default()
        };
        if request.points.is_some() {
            out.points = source.points.clone();
            out.point_descriptors = source.point_descriptors.clone();
        }
        if request.lines.is_some() {
            for (i, line) in source.lines.iter().enumerate() {
                if line.length > request.min_line_length {
                    out.lines.push(*line);
                    out.line_descriptors.push_row(source.line_descriptors.row(i))?;
                }
            }
        }
        Ok(out)
    }
}

/// A random scene of points and roughly vertical segments.
fn random_scene(
    rng: &mut StdRng,
    num_points: usize,
    num_lines: usize,
    noise_bits: usize,
) -> (Vec<ScenePoint>, Vec<SceneLine>) {
    let points = (0..num_points)
        .map(|_| {
            let p = random_point(rng);
            let (l, r) = descriptor_pair(rng, noise_bits);
            (p, l, r)
        })
        .collect();
    let lines = (0..num_lines)
        .map(|_| {
            let start = random_point(rng);
            let end = start
                + DVec3::new(
                    rng.random_range(-0.3..0.3),
                    rng.random_range(0.5..1.5),
                    rng.random_range(-0.2..0.2),
                );
            let (l, r) = descriptor_pair(rng, noise_bits);
            (start, end, l, r)
        })
        .collect();
    (points, lines)
}

/// Extract the stereo features of one frame of the forward moving camera.
fn process_frame(
    frame_idx: usize,
    camera: &Arc<dyn StereoCamera>,
    config: &StereoConfig,
    points: &[ScenePoint],
    lines: &[SceneLine],
) -> Result<(StereoFrame, ExtractionSummary), StereoError> {
    let size = ImageSize {
        width: camera.width(),
        height: camera.height(),
    };
    let offset = DVec3::new(0.0, 0.0, 0.2 * frame_idx as f64);
    let detector = SceneDetector::new(camera.as_ref(), points, lines, offset)?;
    let pipeline = StereoPipeline::new(config.clone(), detector)?;

    let mut frame = StereoFrame::new(
        GrayImage::from_size_val(size, LEFT_MARKER)?,
        GrayImage::from_size_val(size, RIGHT_MARKER)?,
        frame_idx,
        camera.clone(),
    )?;

    let summary = if frame_idx == 0 {
        frame.extract_initial_stereo_features(&pipeline)?
    } else {
        frame.extract_stereo_features(&pipeline)?
    };
    Ok((frame, summary))
}

fn camera() -> Result<Arc<dyn StereoCamera>, StereoError> {
    let camera = PinholeStereoCamera::new((450.0, 450.0), (320.0, 240.0), (640, 480), 0.12)?;
    Ok(Arc::new(camera))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config: StereoConfig = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => StereoConfig::default(),
    };
    if let Some(min_ratio) = args.min_ratio {
        config.min_ratio_12_p = min_ratio;
    }

    let camera = camera()?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let (points, lines) = random_scene(&mut rng, args.num_points, args.num_lines, args.noise_bits);

    for frame_idx in 0..args.num_frames {
        let (frame, summary) = process_frame(frame_idx, &camera, &config, &points, &lines)?;

        let mean_depth = if frame.points().is_empty() {
            0.0
        } else {
            frame.points().iter().map(|p| p.point.z).sum::<f64>() / frame.points().len() as f64
        };

        log::info!(
            "frame {frame_idx}: {}/{} points (mean depth {mean_depth:.2} m), {}/{} lines",
            summary.points_accepted,
            summary.point_candidates,
            summary.lines_accepted,
            summary.line_candidates,
        );
        if let Some(mad) = summary.line_mad {
            log::debug!(
                "frame {frame_idx}: line nn_mad {:.2}, nn12_mad {:.2}",
                mad.nn_mad,
                mad.nn12_mad
            );
        }
    }

    Ok(())
}
