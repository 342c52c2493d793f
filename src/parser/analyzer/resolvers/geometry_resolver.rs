use crate::{
    catalog::{concat_user_data, frames_compatible, FieldInfo, StcInfo},
    parser::{
        analyzer::{info_of, AnalysisContext},
        ast::{Node, NodeKind},
    },
};

pub struct GeometryResolver;

impl GeometryResolver {
    pub fn field_info(node: &Node, ctx: &mut AnalysisContext) -> FieldInfo {
        let args = Self::argument_infos(node);
        let user_data = concat_user_data(&args);

        let info = match node.kind() {
            NodeKind::Point | NodeKind::Circle | NodeKind::Rectangle | NodeKind::Polygon => {
                return Self::constructor(node, &args, ctx);
            }
            NodeKind::PredicateGeometryFunction => {
                let frames: Vec<Option<&str>> = (0..2)
                    .map(|i| node.argument(i).and_then(|a| a.frame()))
                    .collect();
                if let [a, b] = frames.as_slice() {
                    if !frames_compatible(*a, *b) {
                        ctx.warn(format!(
                            "In {}: the arguments' coordinate systems are not compatible",
                            node.function_name().unwrap_or_default()));
                    }
                }
                FieldInfo::dimensionless()
            }
            NodeKind::Distance => FieldInfo::new("deg", "pos.angDistance").with_type("double precision"),
            NodeKind::Area => FieldInfo::new("deg**2", "phys.angArea").with_type("double precision"),
            NodeKind::Centroid => {
                let arg = args.first().cloned().unwrap_or_default();
                let unit = arg.unit.split(',').take(2).collect::<Vec<_>>().join(",");
                FieldInfo { unit, ucd: String::new(), stc: arg.stc, ..FieldInfo::default() }
            }
            NodeKind::PointFunction => return Self::point_function(node, args),
            NodeKind::StcRegion => {
                let frame = node.region().and_then(|r| r.frame.as_deref());
                FieldInfo { stc: frame.map(StcInfo::frame), ..FieldInfo::new("deg", "") }
            }
            _ => FieldInfo::dimensionless(),
        };
        FieldInfo { user_data, ..info }
    }

    fn argument_infos(node: &Node) -> Vec<FieldInfo> {
        (0..node.arguments().len())
            .map(|i| node.argument(i).map(|a| info_of(a)).unwrap_or_default())
            .collect()
    }

    /// POINT, CIRCLE, BOX and POLYGON: the unit lists the units of the
    /// coordinates; arguments in a clashing frame are reported.
    fn constructor(node: &Node, args: &[FieldInfo], ctx: &mut AnalysisContext) -> FieldInfo {
        let frame = node.function().and_then(|f| f.frame.as_deref());
        let coordinates = args.get(1..).unwrap_or_default();
        let kind = node.function_name().unwrap_or_default().to_lowercase();

        for (index, arg) in coordinates.iter().enumerate() {
            let arg_frame = arg.stc.as_ref().map(|s| s.frame.as_str());
            if !frames_compatible(frame, arg_frame) {
                ctx.warn(format!("When constructing {}: Argument {} has incompatible STC", kind, index + 1));
            }
        }

        FieldInfo {
            unit: coordinates.iter().map(|a| a.unit.as_str()).collect::<Vec<_>>().join(","),
            ucd: String::new(),
            stc: frame.map(StcInfo::frame),
            tainted: false,
            user_data: concat_user_data(coordinates),
            sql_type: Some(match node.kind() {
                NodeKind::Point => "spoint",
                NodeKind::Circle => "scircle",
                _ => "spoly",
            }.to_string()),
        }
    }

    /// COORDSYS, COORD1 and COORD2.
    fn point_function(node: &Node, args: Vec<FieldInfo>) -> FieldInfo {
        let arg = args.into_iter().next().unwrap_or_default();
        let index = match node.function_name() {
            Some("COORD1") => 0,
            Some("COORD2") => 1,
            _ => return FieldInfo { user_data: arg.user_data, ..FieldInfo::new("", "meta.ref;pos.frame").with_type("text") },
        };

        let unit = arg.unit.split(',').nth(index).unwrap_or_default().to_string();
        let user_data = if arg.user_data.len() == 2 {
            arg.user_data.get(index).cloned().into_iter().collect()
        } else {
            arg.user_data
        };
        FieldInfo {
            unit,
            ucd: String::new(),
            stc: arg.stc,
            tainted: false,
            user_data,
            sql_type: Some("double precision".to_string()),
        }
    }
}
