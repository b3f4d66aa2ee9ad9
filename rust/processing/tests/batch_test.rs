// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end processing of JSON and text requests

use approx::assert_relative_eq;
use polyforge_processing::{
    parse_requests, process_batch, process_request, ProcessingConfig, ProcessingError,
    ShapeRequest,
};

const REQUESTS: &str = r#"[
    {
        "kind": "extrusion",
        "thickness": 0.0,
        "loops": [
            { "points": [[-1, -1], [1, -1], [1, 1], [-1, 1]] },
            { "points": [[-0.3, -0.3], [0.3, -0.3], [0.3, 0.3], [-0.3, 0.3]], "role": "hole" }
        ]
    },
    {
        "kind": "revolution",
        "radial_segments": 16,
        "close_top": true,
        "close_bottom": true,
        "top_rounding": { "segments": 4, "size": 0.1 },
        "profile": { "points": [[1, 0], [1, 2]] }
    },
    {
        "kind": "revolution",
        "radial_segments": 12,
        "spiral": { "turns": 3, "pitch": 1.5 },
        "close_top": true,
        "close_bottom": true,
        "profile": { "points": [[2, 0], [2.5, 0], [2.5, 0.5], [2, 0.5]], "kind": "closed" }
    },
    {
        "kind": "patch",
        "thickness": 0.2,
        "bevel": 0.02,
        "scale": 2.0,
        "flip_y": true,
        "loops": [{ "points": [[0, 0], [1, 0], [1, 1], [0, 1]] }]
    }
]"#;

fn config() -> ProcessingConfig {
    ProcessingConfig {
        worker_threads: 4,
        ..ProcessingConfig::defaults()
    }
}

#[test]
fn test_batch_matches_sequential() {
    let requests = parse_requests(REQUESTS).unwrap();
    assert_eq!(requests.len(), 4);

    let batch = process_batch(&requests, &config()).unwrap();
    for (request, result) in requests.iter().zip(&batch) {
        let single = process_request(request, &config()).unwrap();
        assert_eq!(result.as_ref().unwrap(), &single, "{} differs", request.kind());
    }
}

#[test]
fn test_flat_holed_area() {
    let requests = parse_requests(REQUESTS).unwrap();
    let shape = process_request(&requests[0], &config()).unwrap();
    assert_relative_eq!(shape.stats.surface_area, 3.64, epsilon = 1e-9);
    assert_eq!(shape.stats.bounds_min[2], 0.0);
}

#[test]
fn test_spiral_lift() {
    let requests = parse_requests(REQUESTS).unwrap();
    let shape = process_request(&requests[2], &config()).unwrap();
    assert_relative_eq!(shape.stats.bounds_max[1], 0.5 + 4.5, epsilon = 1e-12);
    assert_relative_eq!(shape.stats.bounds_min[1], 0.0, epsilon = 1e-12);
}

#[test]
fn test_points_file_request() {
    let json = r#"{ "kind": "extrusion", "thickness": 1.0, "front": { "segments": 1, "size": 0.05 } }"#;
    let text = "# OUTER\n-1,-1\n1,-1\n1,1\n-1,1\n-1,-1\n\n# HOLE\n-0.3 -0.3\n0.3 -0.3\n0.3 0.3\n-0.3 0.3\n";
    let request = ShapeRequest::from_json_with_points(json, text).unwrap();
    let shape = process_request(&request, &config()).unwrap();

    // Faces, walls and the bevel strip
    assert_eq!(shape.stats.materials.len(), 3);
    assert_eq!(shape.stats.materials.get(&1), Some(&8));
}

#[test]
fn test_errors_are_wrapped() {
    let bad_text = ShapeRequest::from_json_with_points(r#"{ "kind": "patch", "thickness": 1 }"#, "1,x\n");
    assert!(matches!(bad_text, Err(ProcessingError::Points(_))));

    let bad_json = parse_requests("{ not json");
    assert!(matches!(bad_json, Err(ProcessingError::Request(_))));

    let too_thin = ShapeRequest::from_json(
        r#"{ "kind": "extrusion", "thickness": 0.1, "front": { "segments": 1, "size": 0.5 },
             "loops": [{ "points": [[0, 0], [4, 0], [4, 4], [0, 4]] }] }"#,
    )
    .unwrap();
    assert!(matches!(
        process_request(&too_thin, &config()),
        Err(ProcessingError::Geometry(_))
    ));
}
