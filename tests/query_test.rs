mod common;

use galaxy_explorer::analysis::histogram::{BinEdges, ValueRange};
use galaxy_explorer::analysis::lookup::AxisRange;
use galaxy_explorer::data::model::RecordId;
use galaxy_explorer::query::classify::ParameterSpec;
use galaxy_explorer::query::series::Skip;
use galaxy_explorer::{QueryContext, QueryError};

use common::{dirty_catalog, open_text};

fn ids(points: impl Iterator<Item = RecordId>) -> Vec<usize> {
    points.map(|id| id.0).collect()
}

#[test]
fn dirty_cells_are_cleaned_on_load() {
    let catalog = dirty_catalog();
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.parameters(), ["a", "b", "c"]);

    let a = catalog.series("a").unwrap();
    assert_eq!(a.values(), vec![1.0, 2.0, 3.0, 4.5, 5.0, 6.0]);

    let b = catalog.series("b").unwrap();
    assert_eq!(ids(b.ids()), vec![0, 1, 3, 4, 5]);
    assert_eq!(b.get(RecordId(2)), None);
}

#[test]
fn sum_expression_keeps_rows_with_both_inputs() {
    let catalog = dirty_catalog();
    assert!(matches!(catalog.classify("a + b").unwrap(), ParameterSpec::Expression(_)));

    let sum = catalog.series("a + b").unwrap();
    assert_eq!(ids(sum.ids()), vec![0, 1, 3, 4, 5]);
    assert_eq!(sum.values(), vec![11.0, 22.0, 44.5, 55.0, 66.0]);
    assert_eq!(sum.skipped(), 1);
}

#[test]
fn division_by_zero_drops_only_that_row() {
    let catalog = dirty_catalog();
    let ratio = catalog.series("b / c").unwrap();
    assert_eq!(ids(ratio.ids()), vec![3, 5]);
    assert_eq!(ratio.values(), vec![20.0, 20.0]);

    assert!(matches!(
        catalog.value_for(RecordId(0), "b / c").unwrap(),
        Err(Skip::EvaluationFailure(_))
    ));
    assert!(matches!(
        catalog.value_for(RecordId(2), "b / c").unwrap(),
        Err(Skip::MissingInput { .. })
    ));
}

#[test]
fn bad_parameter_text_is_reported() {
    let catalog = dirty_catalog();
    assert_eq!(catalog.series("   ").unwrap_err(), QueryError::EmptyParameter);
    assert_eq!(
        catalog.series("redshift").unwrap_err(),
        QueryError::UnrecognizedParameter("redshift".into())
    );
    assert_eq!(catalog.label("redshift"), "Unknown parameter: redshift");
}

#[test]
fn display_names_fall_back_in_order() {
    let catalog = dirty_catalog();
    assert_eq!(
        catalog.names().as_slice(),
        ["NGC0001", "PGC102", "PGC303", "UGC0004", "IC0005", "ESO0006"]
    );
}

#[test]
fn display_names_without_name_column() {
    let catalog = open_text("ids.csv", "pgc;a\n101;1\n;2\n303;3\n404;4\n505;5\n");
    assert_eq!(
        catalog.names().as_slice(),
        ["PGC101", "Galaxy_2", "PGC303", "PGC404", "PGC505"]
    );
    assert_eq!(catalog.resolve("PGC303").unwrap(), RecordId(2));
}

#[test]
fn designators_resolve_by_name_number_and_fragment() {
    let catalog = dirty_catalog();
    assert_eq!(catalog.resolve("NGC0001").unwrap(), RecordId(0));
    assert_eq!(catalog.resolve("PGC303").unwrap(), RecordId(2));
    // display name is NGC0001, the catalog number still finds it
    assert_eq!(catalog.resolve("PGC101").unwrap(), RecordId(0));
    assert_eq!(catalog.resolve(" pgc 606 ").unwrap(), RecordId(5));
    assert_eq!(catalog.resolve("ugc").unwrap(), RecordId(3));
    assert_eq!(
        catalog.resolve("M31").unwrap_err(),
        QueryError::IdentityNotFound("M31".into())
    );
    assert!(catalog.resolve("").is_err());
    assert_eq!(catalog.search("c0"), vec!["NGC0001", "UGC0004", "IC0005"]);
}

#[test]
fn pairing_is_by_identity_not_position() {
    let catalog = dirty_catalog();
    let joint = catalog.joint("b", "c").unwrap();
    assert_eq!(joint.ids, vec![RecordId(0), RecordId(1), RecordId(3), RecordId(5)]);
    assert_eq!(joint.xs, vec![10.0, 20.0, 40.0, 60.0]);
    assert_eq!(joint.ys, vec![0.0, 0.0, 2.0, 3.0]);

    match catalog.scatter("b", "c", &QueryContext::default()) {
        Err(QueryError::InsufficientData { joint, required, .. }) => {
            assert_eq!(joint, 4);
            assert_eq!(required, 5);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[test]
fn scatter_click_picks_the_nearby_object() {
    let catalog = dirty_catalog();
    let ctx = QueryContext::default();
    let plot = catalog.scatter("a", "b", &ctx).unwrap();
    let points = plot.points();
    assert_eq!(points.len(), 5);

    let axes = (AxisRange::new(0.0, 7.0), AxisRange::new(0.0, 70.0));
    let picked = catalog.pick(&points, (4.6, 41.0), axes, &ctx).unwrap();
    assert_eq!(picked.name, "UGC0004");
    assert_eq!(picked.secondary_id, Some(404));

    assert!(catalog.pick(&points, (3.0, 30.0), axes, &ctx).is_none());
}

#[test]
fn histogram_bins_over_displayed_range() {
    let edges = BinEdges::uniform(ValueRange::new(0.0, 10.0).unwrap(), 2).unwrap();
    assert_eq!(edges.bin_of(5.0), Some(1));
    assert_eq!(edges.bin_of(10.0), Some(1));

    let catalog = dirty_catalog();
    let mut ctx = QueryContext::default().with_x_range(Some(ValueRange::new(0.0, 10.0).unwrap()));
    ctx.histogram_bins = 2;
    let plot = catalog.histogram("a", &ctx).unwrap();
    assert_eq!(plot.histogram.counts(), [4, 2]);
    assert_eq!(plot.histogram.members_at(7.0), vec![RecordId(4), RecordId(5)]);
}

#[test]
fn correlation_of_nearly_linear_parameters() {
    let catalog = dirty_catalog();
    let corr = catalog.correlation("a", "b", &QueryContext::default()).unwrap();
    assert_eq!(corr.fit.pairs, 5);
    assert!(corr.fit.r > 0.99);
    assert!(corr.fit.slope > 0.0);
    assert_eq!(corr.x.count, 5);
}

#[test]
fn object_profile_ranks_within_catalog() {
    let catalog = dirty_catalog();
    let id = catalog.resolve("UGC0004").unwrap();
    let profile = catalog.object_profile(id, "a").unwrap();
    assert_eq!(profile.value, 4.5);
    assert_eq!(profile.percentile, 50.0);
    assert_eq!(profile.population.count, 6);

    let missing = catalog.resolve("PGC303").unwrap();
    assert_eq!(
        catalog.object_profile(missing, "b").unwrap_err(),
        QueryError::NoValueForObject {
            object: "PGC303".into(),
            parameter: "b".into()
        }
    );
}
