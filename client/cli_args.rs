use crate::geometry::Rectangle;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "netroute-cli",
    version,
    about = "Index GeoJSON features in a quadtree and run window queries",
    long_about = "netroute-cli loads a GeoJSON FeatureCollection into an MX-CIF quadtree keyed by \
feature bounding boxes.\nWith --bbox it prints the features found in the window, otherwise it \
prints index statistics."
)]
pub struct CliArgs {
    /// 配置文件路径
    #[arg(short, long, default_value = "netroute.toml")]
    pub config: String,

    /// 生成默认配置文件并退出
    #[arg(long)]
    pub generate_config: bool,

    /// Log level (overrides config file)
    #[arg(long)]
    pub log_level: Option<String>,

    /// GeoJSON FeatureCollection to index
    #[arg(short, long)]
    pub input: Option<String>,

    /// Query window as minx,maxx,miny,maxy
    #[arg(short, long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: Option<Rectangle>,

    /// Drop candidates whose bounding box does not intersect the window
    #[arg(long)]
    pub exact: bool,
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.generate_config {
            return Ok(());
        }

        if self.input.is_none() {
            return Err("No input specified. Use --input <file.geojson>.".to_string());
        }

        if self.exact && self.bbox.is_none() {
            return Err("--exact requires --bbox".to_string());
        }

        Ok(())
    }
}

/// Parses `minx,maxx,miny,maxy`.
pub fn parse_bbox(s: &str) -> Result<Rectangle, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in bbox '{}': {}", s, e))?;

    match values.as_slice() {
        [min_x, max_x, min_y, max_y] => {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(format!("bbox '{}' must be finite", s));
            }
            Ok(Rectangle::new(*min_x, *max_x, *min_y, *max_y))
        }
        _ => Err(format!(
            "bbox '{}' must have 4 values: minx,maxx,miny,maxy",
            s
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        assert_eq!(
            parse_bbox("-1,1,-2.5,2.5").unwrap(),
            Rectangle::new(-1.0, 1.0, -2.5, 2.5)
        );
        assert_eq!(
            parse_bbox(" 4.8, 5.0 ,52.3,52.4").unwrap(),
            Rectangle::new(4.8, 5.0, 52.3, 52.4)
        );
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("1,2,x,4").is_err());
        assert!(parse_bbox("1,inf,3,4").is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs::try_parse_from([
            "netroute-cli",
            "--input",
            "roads.geojson",
            "--bbox",
            "-1,1,-1,1",
            "--exact",
        ])
        .unwrap();
        assert_eq!(args.input.as_deref(), Some("roads.geojson"));
        assert_eq!(args.bbox, Some(Rectangle::new(-1.0, 1.0, -1.0, 1.0)));
        assert!(args.exact);
        assert_eq!(args.config, "netroute.toml");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let args = CliArgs::try_parse_from(["netroute-cli"]).unwrap();
        assert!(args.validate().is_err());

        let args = CliArgs::try_parse_from(["netroute-cli", "--generate-config"]).unwrap();
        assert!(args.validate().is_ok());

        let args = CliArgs::try_parse_from(["netroute-cli", "-i", "a.geojson", "--exact"]).unwrap();
        assert!(args.validate().is_err());
    }
}
