//! Fixtures shared by the survey parser tests
//!
//! The three exports below describe the same system, "Demo" in the
//! Andromeda sector, with one wormhole, a star and one planet.

use crate::app::models::{Coordinates, Location};
use crate::config::LengthByteOrder;
use crate::constants::{MAIL_LEADING_BLOCK_LEN, MAIL_SENDER_TRAILER_LEN};

mod resource_line_tests;
mod text_tests;

/// Plain-text console export of the demo system
pub const DEMO_TEXT_SURVEY: &str = "\
03/14/13 09:26 PM

Officer Vex reporting.
Sensor sweep complete.
Location
Orbiting Demo I
Demo (1.5, -2.25, 3)
Andromeda Sector (4, 5, -6)

Astronomical data
Wormhole survey
Wormholes
Wormhole 1
Positive Wormhole
Far (1, 2, 3)
Beyond Sector (0, 0, 1)
Charted by Vex

Demo
Primary
  Type Yellow Dwarf
  Spectral Class G2
  Size Medium
Photosphere
  1,392,000m Diameter
  Type Solar Plasma Q120 40%
  Antiflux Particles Q228 4%
  Dark Matter None

Demo I
Orbiting Demo 45\u{B0}
  Inner Zone
Geosphere
  Rocky Planet, 12,742m Diameter
  Ore Q64 12%, None, Q60 8%
Atmosphere
  1.2 atm Density
  Air Q20 70%
Biosphere
  Vegetation Q12, None, Q30
";

/// HTML body of the mail export of the demo system
pub const DEMO_MAIL_BODY: &str = "\
<html><head><style>big { font-size: 120% }</style></head><body>
UTC:51423E18<br>
Officer Vex reporting.<br>
Sensor sweep complete.<br>
Orbiting Demo I<br>
Demo System (1.5, -2.25, 3)<br>
Andromeda Sector (4, 5, -6)<br>
<p><big>Wormholes</big></p>
<b>Wormhole 1</b><br>
Positive Wormhole<br>
Far System (1, 2, 3)<br>
Beyond Sector (0, 0, 1)<br>
Charted by Vex<br>
<p><big>Demo</big></p>
<b>Primary</b><br>
Type Yellow Dwarf<br>
Spectral Class G2<br>
Size Medium<br>
<b>Photosphere</b><br>
1,392,000m Diameter<br>
Type Solar Plasma Q120 40%<br>
Antiflux Particles Q228 4%<br>
Dark Matter None<br>
<p><big>Demo I</big></p>
<b>Orbiting Demo 45&#176;</b><br>
Inner Zone<br>
<b>Geosphere</b><br>
Rocky Planet, 12,742m Diameter<br>
Ore Q64 12%, None, Q60 8%<br>
<b>Atmosphere</b><br>
1.2 atm Density<br>
Air Q20 70%<br>
<b>Biosphere</b><br>
Vegetation Q12, None, Q30<br>
</body></html>
";

/// Starmap export holding the demo system and one unsurveyed neighbour
pub const DEMO_STARMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<starmap>
  <galaxy name="Andromeda Galaxy">
    <sector name="Andromeda" x="4" y="5" z="-6">
      <system name="Demo" x="41.5" y="47.75" z="-57" eod="Surveyed">
        <wormhole polarity="Positive" name="Far" sector="Beyond"
                  x="1" y="2" z="13" sectorX="0" sectorY="0" sectorZ="1"/>
        <star name="Demo" type="Yellow Dwarf" spectralClass="G2"
              size="Medium" diameter="1,392,000m">
          <resource name="Type Solar Plasma" quality="120" abundance="40"/>
          <resource name="Antiflux Particles" qualityZone1="228" abundanceZone1="4"/>
          <resource name="Dark Matter" quality="None" abundance="None"/>
        </star>
        <planet name="Demo I" kind="Rocky Planet" diameter="12742m"
                orbits="Demo" zone="Inner Zone" resourceZones="3">
          <resource name="Ore" qualityZone1="64" abundanceZone1="12"
                    qualityZone3="60" abundanceZone3="8"/>
          <resource name="Air" qualityZone1="20" abundanceZone1="70"
                    qualityZone2="20" abundanceZone2="70"
                    qualityZone3="20" abundanceZone3="70"/>
          <resource name="Vegetation" qualityZone1="12" abundanceZone1="100"
                    qualityZone2="None" abundanceZone2="None"
                    qualityZone3="30" abundanceZone3="100"/>
        </planet>
      </system>
      <system name="Haze" x="45" y="52" z="-55" eod="Charted">
        <star name="Haze" type="Red Dwarf"/>
      </system>
    </sector>
  </galaxy>
</starmap>
"#;

/// Location every fixture resolves the demo system to
pub fn demo_location() -> Location {
    Location::new(
        "Demo",
        "Andromeda",
        Coordinates::new(1.5, -2.25, 3.0),
        Coordinates::new(4.0, 5.0, -6.0),
    )
}

/// Destination of the demo system's wormhole
pub fn far_location() -> Location {
    Location::new(
        "Far",
        "Beyond",
        Coordinates::new(1.0, 2.0, 3.0),
        Coordinates::new(0.0, 0.0, 1.0),
    )
}

fn utf16_be(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// Wrap strings in a mail container
pub fn build_mail(sender: &str, title: &str, body: &str, order: LengthByteOrder) -> Vec<u8> {
    let mut bytes = vec![0u8; MAIL_LEADING_BLOCK_LEN];

    let sender = utf16_be(sender);
    bytes.push(sender.len() as u8);
    bytes.extend(sender);
    bytes.extend(vec![0u8; MAIL_SENDER_TRAILER_LEN]);

    let title = utf16_be(title);
    bytes.push(title.len() as u8);
    bytes.extend(title);

    let body = utf16_be(body);
    let length = body.len() as u32;
    match order {
        LengthByteOrder::LittleEndian => bytes.extend(length.to_le_bytes()),
        LengthByteOrder::BigEndian => bytes.extend(length.to_be_bytes()),
    }
    bytes.extend(body);
    bytes
}

/// Demo system survey mail with a little-endian body length
pub fn demo_mail() -> Vec<u8> {
    build_mail(
        "Officer Vex",
        "System Survey: Demo",
        DEMO_MAIL_BODY,
        LengthByteOrder::LittleEndian,
    )
}
