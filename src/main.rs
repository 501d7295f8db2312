use anyhow::{Context, Result};

use rusty_mvpa::synth::evoked_recording;
use rusty_mvpa::{
    init_filter_state, AttrInput, AttrValue, Attribute, ChannelTimeseriesOptions, Dataset,
    Selector,
};

/// Parse `[n_observations n_channels n_timepoints]`, falling back to defaults.
fn parse_dims() -> Result<(usize, usize, usize)> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let defaults = [40, 4, 50];
    let mut dims = defaults;
    for (i, arg) in args.iter().take(3).enumerate() {
        dims[i] = arg
            .parse()
            .with_context(|| format!("argument {}: '{arg}' is not a valid count", i + 1))?;
    }
    Ok((dims[0], dims[1], dims[2]))
}

fn main() -> Result<()> {
    env_logger::init();

    let (n_obs, n_channels, n_timepoints) = parse_dims()?;
    let rec = evoked_recording(n_obs, n_channels, n_timepoints, 4, 42)
        .context("generating synthetic recording")?;

    let ds = Dataset::from_channeltimeseries(
        rec.samples,
        ChannelTimeseriesOptions {
            targets: Some(AttrInput::Vector(rec.targets)),
            chunks: Some(AttrInput::Vector(rec.chunks)),
            ..ChannelTimeseriesOptions::default()
        }
        .timing(rec.t0, rec.dt)
        .channel_ids(rec.channel_ids.clone()),
    )
    .context("building dataset")?;
    log::info!("built dataset of shape {:?}", ds.shape());

    // keep the first channel, post-stimulus timepoints only
    let first_channel = AttrValue::from(rec.channel_ids[0].as_str());
    let channels = ds
        .fa()
        .get("channels")
        .and_then(Attribute::as_array)
        .context("dataset has no channel attribute")?;
    let timepoints = ds
        .fa()
        .get("timepoints")
        .and_then(Attribute::as_array)
        .context("dataset has no timepoint attribute")?;
    let keep: Vec<bool> = channels
        .iter()
        .zip(timepoints)
        .map(|(c, t)| *c == first_channel && t.as_f64().is_some_and(|t| t >= 0.0))
        .collect();
    let roi = ds
        .select_features(Selector::Mask(keep))
        .context("selecting features")?;

    let mut filters = init_filter_state(&roi);
    filters.insert("targets".into(), [AttrValue::from("face")].into_iter().collect());
    let faces = roi.select_where(&filters).context("filtering observations")?;
    log::info!(
        "{} of {} observations are faces",
        faces.nsamples(),
        roi.nsamples()
    );

    let summary = serde_json::to_string_pretty(&faces.summary()).context("rendering summary")?;
    println!("{summary}");
    println!("idhash: {}", faces.idhash());
    Ok(())
}
