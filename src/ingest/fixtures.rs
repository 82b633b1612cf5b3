/// Test fixtures: representative payloads from the SMHI IBWW warning feed.
///
/// Structurally complete but trimmed to the fields the service reads.
/// Feed shape:
///   [ warning ]
///     .id, .event { en, sv, code }
///     .warningAreas[]
///       .area           : GeoJSON Feature, geometry in [lon, lat]
///       .warningLevel   : { en, sv, code: YELLOW | ORANGE | RED }
///       .affectedAreas[]: { id, sv, en }
///
/// Geography used throughout the tests:
///   Stockholm box   lon 17.5..18.8, lat 59.0..59.6   (ORANGE wind)
///   Gothenburg box  lon 11.5..12.5, lat 57.5..58.0   (YELLOW wind)
///   Uppsala box     lon 17.3..18.0, lat 59.7..60.0   (RED rain, multipolygon)
///   Gävle box       lon 16.8..17.4, lat 60.5..60.8   (RED rain, multipolygon)

/// Two warnings: WIND with an ORANGE and a YELLOW area, RAIN with one RED
/// multipolygon area.
pub(crate) fn fixture_warnings_json() -> &'static str {
    r#"[
      {
        "id": 101,
        "normalProbability": true,
        "event": { "en": "Wind", "sv": "Vind", "code": "WIND",
                   "mhoClassification": { "en": "Meteorology", "sv": "Meteorologi", "code": "MET" } },
        "descriptions": [],
        "warningAreas": [
          {
            "id": 1001,
            "approximateStart": "2024-10-05T06:00:00.000Z",
            "approximateEnd": "2024-10-06T00:00:00.000Z",
            "published": "2024-10-04T12:00:00.000Z",
            "normalProbability": true,
            "areaName": { "en": "Stockholm archipelago", "sv": "Stockholms skärgård" },
            "warningLevel": { "en": "Orange", "sv": "Orange", "code": "ORANGE" },
            "eventDescription": { "en": "Wind", "sv": "Vind", "code": "WIND" },
            "affectedAreas": [ { "id": 1, "sv": "Stockholms län", "en": "Stockholm County" } ],
            "area": {
              "type": "Feature",
              "geometry": {
                "type": "Polygon",
                "coordinates": [[[17.5, 59.0], [18.8, 59.0], [18.8, 59.6], [17.5, 59.6], [17.5, 59.0]]]
              },
              "properties": {}
            }
          },
          {
            "id": 1002,
            "approximateStart": "2024-10-05T06:00:00.000Z",
            "published": "2024-10-04T12:00:00.000Z",
            "normalProbability": true,
            "warningLevel": { "en": "Yellow", "sv": "Gul", "code": "YELLOW" },
            "affectedAreas": [ { "id": 14, "sv": "Västra Götalands län", "en": "Västra Götaland County" } ],
            "area": {
              "type": "Feature",
              "geometry": {
                "type": "Polygon",
                "coordinates": [[[11.5, 57.5], [12.5, 57.5], [12.5, 58.0], [11.5, 58.0], [11.5, 57.5]]]
              },
              "properties": {}
            }
          }
        ]
      },
      {
        "id": 102,
        "normalProbability": true,
        "event": { "en": "Rain", "sv": "Regn", "code": "RAIN" },
        "warningAreas": [
          {
            "id": 2001,
            "approximateStart": "2024-10-05T12:00:00.000Z",
            "approximateEnd": "2024-10-07T00:00:00.000Z",
            "normalProbability": true,
            "warningLevel": { "en": "Red", "sv": "Röd", "code": "RED" },
            "affectedAreas": [
              { "id": 3, "sv": "Uppsala län", "en": "Uppsala County" },
              { "id": 21, "sv": "Gävleborgs län", "en": "Gävleborg County" }
            ],
            "area": {
              "type": "Feature",
              "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                  [[[17.3, 59.7], [18.0, 59.7], [18.0, 60.0], [17.3, 60.0], [17.3, 59.7]]],
                  [[[16.8, 60.5], [17.4, 60.5], [17.4, 60.8], [16.8, 60.8], [16.8, 60.5]]]
                ]
              },
              "properties": {}
            }
          }
        ]
      }
    ]"#
}

/// One RED warning whose area has coordinates the matcher cannot use.
/// The feed must still decode; only matching skips the area.
pub(crate) fn fixture_malformed_geometry_json() -> &'static str {
    r#"[
      {
        "id": 301,
        "event": { "en": "Fire risk", "sv": "Brandrisk", "code": "FIRE" },
        "warningAreas": [
          {
            "id": 3001,
            "warningLevel": { "en": "Red", "sv": "Röd", "code": "RED" },
            "affectedAreas": [ { "id": 9, "sv": "Gotlands län", "en": "Gotland County" } ],
            "area": {
              "type": "Feature",
              "geometry": { "type": "Polygon", "coordinates": "not-a-ring" },
              "properties": {}
            }
          }
        ]
      }
    ]"#
}

/// One RED warning with four areas: a usable polygon around Stockholm,
/// then an area with a null feature, one whose geometry has no type and
/// one whose geometry type is a number. The feed must decode and keep all
/// four areas.
pub(crate) fn fixture_unusable_areas_json() -> &'static str {
    r#"[
      {
        "id": 401,
        "event": { "en": "Thunderstorm", "sv": "Åska", "code": "THUNDER" },
        "warningAreas": [
          {
            "id": 4001,
            "warningLevel": { "en": "Red", "sv": "Röd", "code": "RED" },
            "affectedAreas": [ { "id": 1, "sv": "Stockholms län", "en": "Stockholm County" } ],
            "area": {
              "type": "Feature",
              "geometry": {
                "type": "Polygon",
                "coordinates": [[[17.5, 59.0], [18.8, 59.0], [18.8, 59.6], [17.5, 59.6], [17.5, 59.0]]]
              }
            }
          },
          {
            "id": 4002,
            "warningLevel": { "en": "Red", "sv": "Röd", "code": "RED" },
            "affectedAreas": [ { "id": 3, "sv": "Uppsala län", "en": "Uppsala County" } ],
            "area": null
          },
          {
            "id": 4003,
            "warningLevel": { "en": "Red", "sv": "Röd", "code": "RED" },
            "affectedAreas": [ { "id": 4, "sv": "Södermanlands län", "en": "Södermanland County" } ],
            "area": { "type": "Feature", "geometry": { "coordinates": [[[16.0, 58.8], [17.0, 58.8], [17.0, 59.2]]] } }
          },
          {
            "id": 4004,
            "warningLevel": { "en": "Red", "sv": "Röd", "code": "RED" },
            "affectedAreas": [ { "id": 5, "sv": "Östergötlands län", "en": "Östergötland County" } ],
            "area": { "type": "Feature", "geometry": { "type": 7, "coordinates": [] } }
          }
        ]
      }
    ]"#
}

/// Valid JSON, but an object instead of the expected array.
pub(crate) fn fixture_wrapped_object_json() -> &'static str {
    r#"{ "warnings": [] }"#
}
