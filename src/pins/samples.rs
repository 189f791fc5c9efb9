use super::{PinStyle, SamplePin};
use crate::geo::LatLng;
use crate::popup::PopupFlags;

const REMOVABLE_AND_EDITABLE: &str = "This marker is removable and its popup is editable.\n\
\n\
A popup can be editable, removable, both, or neither. This one opened with the \
map and does not auto-close, so other popups can open next to it.\n\
\n\
 - Select a green pin to read about editing.\n\
 - Select a black pin to read about hard-coded removable pins.\n\
 - Press m to place a random marker and see how a list of markers stays in \
sync with its popups.";

const REMOVABLE: &str = "This marker is removable.\n\
\n\
Black pins are hard-coded into the map rather than generated from a list. A \
hard-coded pin needs no index bookkeeping for its remove button to hit the \
right pin.\n\
\n\
Random markers are different: press m to place one and read its popup.";

const EDITABLE: &str = "This popup is editable.\n\
\n\
Green pins can be edited but not removed. Press e to edit the text in place, \
Ctrl-S to save it, or Esc to throw the edit away.\n\
\n\
Saved text is reported back with the index of the pin it belongs to, so the \
owner of the marker list can store it.";

const SEA_MONSTER: &str = "This monster is removable.\n\
\n\
A removable popup has a button that reads \"Remove this <thing>\". The thing \
is \"marker\" unless the pin carries its own nametag, like this one does.";

fn pin(
    lat: f64,
    lng: f64,
    style: PinStyle,
    flags: PopupFlags,
    content: &str,
) -> SamplePin {
    SamplePin {
        coords: LatLng::new(lat, lng),
        style,
        flags,
        nametag: None,
        content: content.to_string(),
        is_open: false,
        auto_close: true,
    }
}

/// The hard-coded pins shown around the Gulf of Mexico and the eastern Pacific
pub fn sample_pins() -> Vec<SamplePin> {
    let both = PopupFlags {
        editable: true,
        removable: true,
    };
    let removable = PopupFlags {
        editable: false,
        removable: true,
    };
    let editable = PopupFlags {
        editable: true,
        removable: false,
    };

    let mut welcome = pin(27.86176, -98.03529, PinStyle::Violet, both, REMOVABLE_AND_EDITABLE);
    welcome.is_open = true;
    welcome.auto_close = false;

    let mut monster = pin(22.0, -130.03529, PinStyle::SeaMonster, removable, SEA_MONSTER);
    monster.nametag = Some("Sea Monster");

    vec![
        welcome,
        pin(20.96176, -117.03529, PinStyle::Black, removable, REMOVABLE),
        pin(22.86176, -100.03529, PinStyle::Black, removable, REMOVABLE),
        pin(15.86176, -90.03529, PinStyle::Black, removable, REMOVABLE),
        pin(25.86176, -112.03529, PinStyle::Green, editable, EDITABLE),
        pin(17.86176, -145.03529, PinStyle::Green, editable, EDITABLE),
        pin(17.86176, -80.03529, PinStyle::Green, editable, EDITABLE),
        monster,
    ]
}
