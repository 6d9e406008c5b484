use std::io::Write;

/// What the conversation surfaces to the person talking to it.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Text(String),
    Transcript(String),
    ResponseDone,
}

/// Renders [`Output`] as a running transcript, one line per response
/// prefixed with the assistant's name.
pub struct Console<W: Write> {
    assistant: String,
    writer: W,
    mid_line: bool,
}

impl<W: Write> Console<W> {
    pub fn new(assistant: &str, writer: W) -> Self {
        Self {
            assistant: assistant.to_string(),
            writer,
            mid_line: false,
        }
    }

    pub fn render(&mut self, output: &Output) -> std::io::Result<()> {
        match output {
            Output::Text(delta) | Output::Transcript(delta) => {
                if !self.mid_line {
                    write!(self.writer, "{}: ", self.assistant)?;
                    self.mid_line = true;
                }
                write!(self.writer, "{}", delta)?;
            }
            Output::ResponseDone => {
                if self.mid_line {
                    writeln!(self.writer)?;
                    self.mid_line = false;
                }
            }
        }
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_once_per_response() {
        let mut console = Console::new("Ada", Vec::new());
        for output in [
            Output::Transcript("Sure, ".into()),
            Output::Transcript("done.".into()),
            Output::ResponseDone,
            Output::ResponseDone,
            Output::Text("Bye".into()),
            Output::ResponseDone,
        ] {
            console.render(&output).unwrap();
        }
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(text, "Ada: Sure, done.\nAda: Bye\n");
    }
}
