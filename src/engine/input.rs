/// Logical commands. Every key in the keymap resolves to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Forward,
    Left,
    Right,
    Pause,
    Confirm,
    Escape,
    Restart,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Forward,
        Command::Left,
        Command::Right,
        Command::Pause,
        Command::Confirm,
        Command::Escape,
        Command::Restart,
    ];

    pub fn from_key(key: &str) -> Option<Command> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Command::Forward),
            "ArrowLeft" | "a" | "A" => Some(Command::Left),
            "ArrowRight" | "d" | "D" => Some(Command::Right),
            " " => Some(Command::Pause),
            "Enter" => Some(Command::Confirm),
            "Escape" => Some(Command::Escape),
            "r" | "R" => Some(Command::Restart),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Held state per command, written by key listeners between ticks.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: [bool; 7],
    // Press seen since the last poll, so a tap shorter than a frame still counts.
    latched: [bool; 7],
}

impl InputState {
    pub fn set(&mut self, command: Command, pressed: bool) {
        let slot = command.slot();
        if pressed && !self.held[slot] {
            self.latched[slot] = true;
        }
        self.held[slot] = pressed;
    }

    pub fn release_all(&mut self) {
        self.held = [false; 7];
    }
}

/// Turns held booleans into one command per press by comparing against the previous tick.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    previous: [bool; 7],
}

impl EdgeDetector {
    pub fn poll(&mut self, input: &mut InputState) -> Vec<Command> {
        let mut fired = Vec::new();
        for command in Command::ALL {
            let slot = command.slot();
            let rising = input.held[slot] && !self.previous[slot];
            if rising || input.latched[slot] {
                fired.push(command);
            }
            input.latched[slot] = false;
            self.previous[slot] = input.held[slot];
        }
        fired
    }
}
