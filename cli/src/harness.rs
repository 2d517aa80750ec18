use std::path::Path;

use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::info;

use hvsc::{Hvsc, PsidFile};
use stil::{ParseOptions, Parser};

/// A single check the driver can run against a SID file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Test {
    Sldb,
    Stil,
    Bugs,
    Psid,
}

impl Test {
    /// Order in which `all` runs them.
    pub const ALL: [Test; 4] = [Test::Sldb, Test::Stil, Test::Bugs, Test::Psid];

    pub fn name(self) -> &'static str {
        match self {
            Test::Sldb => "sldb",
            Test::Stil => "stil",
            Test::Bugs => "bugs",
            Test::Psid => "psid",
        }
    }

    pub fn needs_root(self) -> bool {
        self != Test::Psid
    }
}

/// What to show for a STIL entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct StilView {
    pub tune: Option<u32>,
    pub raw: bool,
    pub options: ParseOptions,
}

pub struct Harness {
    pub hvsc: Option<Hvsc>,
    pub color_choice: ColorChoice,
    pub view: StilView,
}

impl Harness {
    /// Run one test, printing its report on stdout. Returns whether it passed.
    pub fn run(&self, test: Test, sid: &Path) -> bool {
        info!("running '{}' on '{}'", test.name(), sid.display());
        match (test, &self.hvsc) {
            (Test::Psid, _) => self.psid(sid),
            (_, None) => {
                eprintln!("error: '{}' needs an HVSC root", test.name());
                false
            }
            (Test::Sldb, Some(hvsc)) => self.sldb(hvsc, sid),
            (Test::Stil, Some(hvsc)) => self.stil(hvsc, sid),
            (Test::Bugs, Some(hvsc)) => self.bugs(hvsc, sid),
        }
    }

    fn sldb(&self, hvsc: &Hvsc, sid: &Path) -> bool {
        println!("Retrieving song lengths of '{}'", sid.display());
        match hvsc.song_lengths(sid) {
            Ok(Some(lengths)) => {
                println!("Got {} songs:", lengths.len());
                for seconds in lengths {
                    println!("    {:02}:{:02}", seconds / 60, seconds % 60);
                }
                true
            }
            Ok(None) => {
                println!("Songlengths: no entry for '{}'", hvsc.key_for(sid));
                false
            }
            Err(err) => {
                eprintln!("error: {err}");
                false
            }
        }
    }

    fn stil(&self, hvsc: &Hvsc, sid: &Path) -> bool {
        println!("Looking up STIL entry for '{}'", sid.display());
        let entry = match hvsc.stil_entry(sid) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                println!("STIL: no entry for '{}', continuing", hvsc.key_for(sid));
                return true;
            }
            Err(err) => {
                eprintln!("error: {err}");
                return false;
            }
        };

        if self.view.raw {
            println!("Entry text:");
            print!("{entry}");
            println!();
        }

        let mut files = SimpleFiles::new();
        let file_id = files.add(entry.key().to_owned(), entry.text());
        let parser = Parser::new(entry, file_id).with_options(self.view.options);
        let (document, warnings) = match parser.parse_with_diagnostics() {
            Ok(parsed) => parsed,
            Err(err) => {
                eprintln!("error: {err}");
                return false;
            }
        };

        let writer = StandardStream::stderr(self.color_choice);
        let config = term::Config::default();
        for warning in &warnings {
            let diagnostic = warning.to_diagnostic();
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
        }

        let Some(tune) = self.view.tune else {
            print!("{document}");
            return true;
        };
        match document.get_tune(tune) {
            Some(fields) => {
                println!("{{#{tune}}}");
                for field in fields {
                    for line in field.to_string().lines() {
                        println!("  {line}");
                    }
                }
                true
            }
            None => {
                println!("No information for tune {tune}");
                false
            }
        }
    }

    fn bugs(&self, hvsc: &Hvsc, sid: &Path) -> bool {
        match hvsc.bug(sid) {
            Ok(Some(bug)) => {
                println!("Found entry:");
                println!("{{#{}}}", bug.tune);
                println!("{{ bug}} {}", bug.text);
                println!("{{user}} {}", bug.user.as_deref().unwrap_or("(unknown)"));
                true
            }
            Ok(None) => {
                println!("BUGlist: no entry found, no worries");
                true
            }
            Err(err) => {
                eprintln!("error: {err}");
                false
            }
        }
    }

    fn psid(&self, sid: &Path) -> bool {
        println!("Opening '{}'", sid.display());
        match PsidFile::open(sid) {
            Ok(file) => {
                print!("{file}");
                true
            }
            Err(err) => {
                eprintln!("error: {err}");
                false
            }
        }
    }
}
