use hearthwood_core::Upgrade;
use hearthwood_rendering_macroquad::ControlPanelInputState;

fn run_purchase_sequence(sequence: &[Option<Upgrade>]) -> Vec<Option<Upgrade>> {
    let mut state = ControlPanelInputState::default();
    let mut purchases = Vec::new();
    for &pressed in sequence {
        purchases.push(state.take_purchase());
        if let Some(upgrade) = pressed {
            state.register_purchase(upgrade);
        }
    }

    // Flush any trailing latched press so the harness observes the final purchase.
    purchases.push(state.take_purchase());
    purchases
}

fn run_restart_sequence(sequence: &[bool]) -> Vec<bool> {
    let mut state = ControlPanelInputState::default();
    let mut presses = Vec::new();
    for &pressed in sequence {
        presses.push(state.take_restart());
        if pressed {
            state.register_restart();
        }
    }
    presses.push(state.take_restart());
    presses
}

#[test]
fn purchase_button_sequence_is_deterministic() {
    let button_sequence = [
        None,
        Some(Upgrade::Campfire),
        None,
        Some(Upgrade::Hut),
        Some(Upgrade::Campfire),
        None,
    ];
    let expected = vec![
        None,
        None,
        Some(Upgrade::Campfire),
        None,
        Some(Upgrade::Hut),
        Some(Upgrade::Campfire),
        None,
    ];

    let first_run = run_purchase_sequence(&button_sequence);
    let second_run = run_purchase_sequence(&button_sequence);

    assert_eq!(first_run, expected);
    assert_eq!(first_run, second_run);
}

#[test]
fn restart_button_sequence_is_deterministic() {
    let button_sequence = [true, false, true, false, false, true];
    let expected = vec![false, true, false, true, false, false, true];

    let first_run = run_restart_sequence(&button_sequence);
    let second_run = run_restart_sequence(&button_sequence);

    assert_eq!(first_run, expected);
    assert_eq!(first_run, second_run);
}
