//! Command marshalling
//!
//! A [`Command`] is a name plus already-encoded arguments; marshalling a call
//! means encoding each argument to bytes here, then letting the protocol
//! serializer frame the whole thing as a RESP array of bulk strings.

pub mod sorted_set;

pub use sorted_set::SortedSetCommands;

/// A single Redis command ready for serialization
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    args: Vec<Vec<u8>>,
}

impl Command {
    /// Start a command with its name
    pub fn new(name: &str) -> Self {
        Command {
            args: vec![name.as_bytes().to_vec()],
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl CommandArg) -> Self {
        self.args.push(arg.encode());
        self
    }

    /// The command name bytes
    pub fn name(&self) -> &[u8] {
        &self.args[0]
    }

    /// All arguments, name included, in wire order
    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }
}

/// Argument marshalling: anything encodable as a RESP bulk string
pub trait CommandArg {
    fn encode(self) -> Vec<u8>;
}

impl CommandArg for &str {
    fn encode(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl CommandArg for String {
    fn encode(self) -> Vec<u8> {
        self.into_bytes()
    }
}

impl CommandArg for &String {
    fn encode(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl CommandArg for &[u8] {
    fn encode(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl CommandArg for Vec<u8> {
    fn encode(self) -> Vec<u8> {
        self
    }
}

impl CommandArg for i64 {
    fn encode(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl CommandArg for u32 {
    fn encode(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl CommandArg for usize {
    fn encode(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = Command::new("ZRANGE").arg("key").arg(0i64).arg(-1i64);
        assert_eq!(cmd.name(), b"ZRANGE");
        assert_eq!(
            cmd.args(),
            &[
                b"ZRANGE".to_vec(),
                b"key".to_vec(),
                b"0".to_vec(),
                b"-1".to_vec()
            ]
        );
    }

    #[test]
    fn test_binary_args_pass_through() {
        let cmd = Command::new("ZREM").arg("key").arg(vec![0u8, 255u8]);
        assert_eq!(cmd.args()[2], vec![0u8, 255u8]);
    }
}
