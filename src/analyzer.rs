//! Component F: the stateful classifier that turns a stream of rendered
//! lines into the latched-flag JSON summary (spec.md §4.F, §6).

use serde_json::{json, Value};

/// Which entry point drove this analyzer — the two formats share every
/// classification rule except the two called out in spec.md §9: the PLOG
/// `-> client shutdown request` short-circuit and the `missing-symbol`
/// label, neither of which the P7D code path can ever reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    P7d,
    Plog,
}

/// How to decide child-vs-main on the first rendered line.
#[derive(Debug, Clone)]
pub enum ProcessTypeSource {
    /// P7D: compare the dump's decoded `processName` to the literal.
    P7dProcessName(Vec<u16>),
    /// PLOG: compare the first rendered message to the literal.
    PlogFirstMessage,
}

/// The `(module, channel)` context a rendered line arrives with.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub module_name: &'a str,
    pub is_tty: bool,
}

/// Whether the decode loop should keep feeding lines to this analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Stop,
}

const CHILD_PROCESS_NAME: &str = "psOff_tunnel.exe";
const PLOG_CHILD_MESSAGE: &str = "child process";

#[derive(Debug, Default)]
struct Flags {
    is_gpu_picked: bool,

    input_not_found_hint: bool,
    nvidia_hint: bool,
    trophy_key_hint: bool,
    andn_patched: bool,
    insertq_patched: bool,
    extrq_patched: bool,
    ajm_found: bool,

    unity: bool,
    cry: bool,
    unreal: bool,
    phyre: bool,
    gmaker: bool,
    naughty: bool,
    irrlicht: bool,

    fmod: bool,
    mono: bool,
    cri: bool,
    havok: bool,
    wwise: bool,
    dialog: bool,

    shader_gen: bool,
    vk_validation: bool,
    exception: bool,
    net_todo: bool,
    vk_no_devices: bool,
    missing_symbol: bool,
}

pub struct Analyzer {
    source: Source,
    type_source: Option<ProcessTypeSource>,
    guessed: bool,
    is_child: bool,
    flags: Flags,
    doc: Value,
}
impl Analyzer {
    pub fn for_p7d(process_name: Vec<u16>) -> Self {
        Analyzer {
            source: Source::P7d,
            type_source: Some(ProcessTypeSource::P7dProcessName(process_name)),
            guessed: false,
            is_child: false,
            flags: Flags::default(),
            doc: Value::Null,
        }
    }

    pub fn for_plog() -> Self {
        Analyzer {
            source: Source::Plog,
            type_source: Some(ProcessTypeSource::PlogFirstMessage),
            guessed: false,
            is_child: false,
            flags: Flags::default(),
            doc: Value::Null,
        }
    }

    fn child_template() -> Value {
        json!({
            "type": "child-process",
            "labels": [],
            "firmware": [],
            "hints": [],
            "emu_neo": false,
            "emu_skipAjm": false,
            "emu_skipMovies": false,
            "emu_networking": false,
            "emu_noElfCheck": false,
            "title_name": "Unnamed",
            "title_id": "CUSA00000",
            "title_neo": false,
        })
    }

    fn main_template() -> Value {
        json!({
            "type": "main-process",
            "labels": [],
            "hints": [],
            "user-gpu": "UNDETECTED",
            "user-lang": "UNDETECTED",
        })
    }

    /// Feeds one rendered line through the classifier. Returns `Stop` only
    /// for the PLOG-only `Kernel` shutdown short-circuit.
    pub fn handle(&mut self, ctx: LineContext, text: &str) -> LineOutcome {
        if !self.guessed {
            self.guessed = true;
            self.is_child = match self.type_source.take() {
                Some(ProcessTypeSource::P7dProcessName(name)) => {
                    String::from_utf16_lossy(&name) == CHILD_PROCESS_NAME
                }
                Some(ProcessTypeSource::PlogFirstMessage) | None => text == PLOG_CHILD_MESSAGE,
            };
            self.doc = if self.is_child {
                Self::child_template()
            } else {
                Self::main_template()
            };

            if self.source == Source::Plog {
                // PLOG's first line is consumed entirely by the type guess.
                return LineOutcome::Continue;
            }
        }

        if self.is_child {
            self.classify_child(ctx, text)
        } else {
            self.classify_main(ctx, text);
            LineOutcome::Continue
        }
    }

    fn classify_child(&mut self, ctx: LineContext, text: &str) -> LineOutcome {
        if ctx.is_tty {
            if !self.flags.gmaker && text.contains("YoYo Games PS4 Runner") {
                self.flags.gmaker = true;
            }
            if !self.flags.irrlicht && text.contains("Irrlicht Engine") {
                self.flags.irrlicht = true;
            }
            if !self.flags.unreal && text.starts_with("Additional") && text.contains(".uproject") {
                self.flags.unreal = true;
            }
            if !self.flags.unreal && text.contains("uecommandline.txt") {
                self.flags.unreal = true;
            }
            if !self.flags.naughty && text.contains("ND File Server") {
                self.flags.naughty = true;
            }
            if !self.flags.naughty && text.contains("----- Switching world: from") {
                self.flags.naughty = true;
            }
            return LineOutcome::Continue;
        }

        if text.starts_with("todo ") {
            if !self.flags.net_todo && text.starts_with("todo sceNp") {
                self.flags.net_todo = true;
            }
            return LineOutcome::Continue;
        }

        match ctx.module_name {
            "pthread" => {
                if text.starts_with("--> thread") {
                    if !self.flags.unity && (text.contains("UnityWorker") || text.contains("UnityGfx")) {
                        self.flags.unity = true;
                    }
                    if !self.flags.cri && (text.contains("CriThread") || text.contains("CRI FS")) {
                        self.flags.cri = true;
                    }
                    if !self.flags.wwise && (text.contains("Wwise") || text.contains("AK::LibAudioOut")) {
                        self.flags.wwise = true;
                    }
                    if !self.flags.phyre && text.contains("PhyreEngine") {
                        self.flags.phyre = true;
                    }
                    if !self.flags.fmod && text.contains("FMOD mixer") {
                        self.flags.fmod = true;
                    }
                    if !self.flags.havok && text.contains("HavokWorkerThread") {
                        self.flags.havok = true;
                    }
                }
            }
            "libSceKernel" => {
                if !self.flags.mono && (text.contains(".mono\\config") || text.contains(".mono/config")) {
                    self.flags.mono = true;
                }
                if !self.flags.unity && text.contains("unity default resources") {
                    self.flags.unity = true;
                }
                if !self.flags.unreal && text.contains("UE3_logo.") {
                    self.flags.unreal = true;
                }
            }
            "runtime" if self.source == Source::Plog => {
                if !self.flags.missing_symbol && text.contains("Missing Symbol|") {
                    self.flags.missing_symbol = true;
                }
            }
            "Kernel" => {
                if self.source == Source::Plog && text == "-> client shutdown request" {
                    return LineOutcome::Stop;
                }
                if text.starts_with("psOff.") {
                    self.apply_psoff_key(text);
                }
            }
            "ExceptionHandler" => {
                if !self.flags.exception && text.starts_with("Faulty instruction:") {
                    self.flags.exception = true;
                }
            }
            "libSceSysmodule" => {
                if text.starts_with("loading id = ") && !self.flags.dialog && text.contains("Dialog") {
                    self.flags.dialog = true;
                }
            }
            "libSceNpTrophy" => {
                if text == "Missing trophy key!" {
                    self.flags.trophy_key_hint = true;
                }
            }
            "elf_loader" => {
                if !self.flags.unity && text.contains("Il2CppUserAssemblies") {
                    self.flags.unity = true;
                }
                if text.starts_with("load library[") && text.ends_with(".sprx") {
                    let start = text
                        .rfind(|c| c == '\\' || c == '/')
                        .map(|i| i + 1)
                        .unwrap_or(0);
                    self.doc["firmware"]
                        .as_array_mut()
                        .expect("firmware array present in child template")
                        .push(Value::String(text[start..].to_string()));
                }
            }
            "patcher" => {
                if text.starts_with("Applying ") && text.ends_with(" patch") {
                    if text.contains("ANDN") {
                        self.flags.andn_patched = true;
                    }
                    if text.contains("INSERTQ") {
                        self.flags.insertq_patched = true;
                    }
                    if text.contains("EXTRQ") {
                        self.flags.extrq_patched = true;
                    }
                }
            }
            "Ajm::Instance" => {
                self.flags.ajm_found = true;
            }
            _ => {}
        }

        LineOutcome::Continue
    }

    fn apply_psoff_key(&mut self, text: &str) {
        let eq = match text.find('=') {
            Some(i) => i,
            None => return,
        };
        let value_start = eq + 2;
        if value_start > text.len() {
            return;
        }
        let value = &text[value_start..];
        let as_bool = value == "1";

        if text.contains(".isNeo = ") {
            self.doc["emu_neo"] = Value::Bool(as_bool);
        } else if text.contains(".skipAJM = ") {
            self.doc["emu_skipAjm"] = Value::Bool(as_bool);
        } else if text.contains(".skipMovies = ") {
            self.doc["emu_skipMovies"] = Value::Bool(as_bool);
        } else if text.contains(".networking = ") {
            self.doc["emu_networking"] = Value::Bool(as_bool);
        } else if text.contains(".noElfCheck = ") {
            self.doc["emu_noElfCheck"] = Value::Bool(as_bool);
        } else if text.contains(".app.neoSupport = ") {
            self.doc["title_neo"] = Value::Bool(as_bool);
        } else if text.contains(".app.id = ") {
            self.doc["title_id"] = Value::String(value.to_string());
        } else if text.contains(".app.title = ") {
            self.doc["title_name"] = Value::String(value.to_string());
        }
    }

    fn classify_main(&mut self, ctx: LineContext, text: &str) {
        const LANGUAGE_MARKER: &str = "Language switched to ";
        if let Some(idx) = text.find(LANGUAGE_MARKER) {
            self.doc["user-lang"] = Value::String(text[idx + LANGUAGE_MARKER.len()..].to_string());
        }
        if !self.flags.is_gpu_picked && text.contains("Selected GPU:") {
            self.flags.is_gpu_picked = true;
            self.flags.nvidia_hint = text.contains("NVIDIA") || text.contains("nvidia");
            if let Some(idx) = text.find(':') {
                self.doc["user-gpu"] = Value::String(text[idx + 1..].to_string());
            }
        }
        if !self.flags.input_not_found_hint && text.contains("No pad with specified name was found") {
            self.flags.input_not_found_hint = true;
        }
        match ctx.module_name {
            "sb2spirv" => {
                if !self.flags.shader_gen && (text.contains("todo") || text.contains("Instruction missing")) {
                    self.flags.shader_gen = true;
                }
            }
            "videoout" => {
                if !self.flags.vk_validation && text.contains("Validation Error: ") {
                    self.flags.vk_validation = true;
                }
                if !self.flags.vk_no_devices && text == "Failed to find any suitable Vulkan device" {
                    self.flags.vk_no_devices = true;
                }
            }
            _ => {}
        }
    }

    /// Materializes latched flags into `labels`/`hints` and returns the
    /// finished document. Insertion order follows spec.md §4.F's tables.
    pub fn finish(mut self) -> Value {
        if !self.guessed {
            // No line was ever rendered: behave as an empty main-process dump.
            self.doc = Self::main_template();
        }

        if self.is_child {
            let mut labels = Vec::new();
            if self.flags.unity {
                labels.push("engine-unity");
            }
            if self.flags.unreal {
                labels.push("engine-unreal");
            }
            if self.flags.cry {
                labels.push("engine-cry");
            }
            if self.flags.phyre {
                labels.push("engine-phyre");
            }
            if self.flags.gmaker {
                labels.push("engine-gamemaker");
            }
            if self.flags.naughty {
                labels.push("engine-naughty");
            }
            if self.flags.irrlicht {
                labels.push("engine-irrlicht");
            }
            if self.flags.exception {
                labels.push("exception");
            }
            if self.flags.fmod {
                labels.push("sdk-fmod");
            }
            if self.flags.mono {
                labels.push("sdk-mono");
            }
            if self.flags.cri {
                labels.push("sdk-criware");
            }
            if self.flags.havok {
                labels.push("sdk-havok");
            }
            if self.flags.wwise {
                labels.push("sdk-wwise");
            }
            if self.flags.missing_symbol {
                labels.push("missing-symbol");
            }
            self.doc["labels"] = Value::Array(labels.into_iter().map(|s| Value::String(s.to_string())).collect());

            let mut hints: Vec<String> = Vec::new();
            if self.flags.andn_patched || self.flags.extrq_patched || self.flags.insertq_patched {
                let mut tokens = String::new();
                if self.flags.andn_patched {
                    tokens.push_str("ANDN, ");
                }
                if self.flags.extrq_patched {
                    tokens.push_str("EXTRQ, ");
                }
                if self.flags.insertq_patched {
                    tokens.push_str("INSERTQ, ");
                }
                hints.push(format!(
                    "Your CPU does not support some instructions ({}) and they have been patched",
                    tokens
                ));
            }
            if self.flags.ajm_found {
                hints.push("This game uses hardware audio encoding/decoding".to_string());
            }
            if self.flags.trophy_key_hint {
                hints.push(TROPHY_KEY_HINT.to_string());
            }
            self.append_hints(hints);
        } else {
            let mut labels = Vec::new();
            if self.flags.vk_validation {
                labels.push("graphics");
            }
            if self.flags.shader_gen {
                labels.push("shader-gen");
            }
            if self.flags.vk_no_devices {
                labels.push("badgpu");
            }
            self.doc["labels"] = Value::Array(labels.into_iter().map(|s| Value::String(s.to_string())).collect());

            let mut hints = Vec::new();
            if self.flags.input_not_found_hint {
                hints.push(INPUT_NOT_FOUND_HINT.to_string());
            }
            if self.flags.nvidia_hint {
                hints.push(NVIDIA_HINT.to_string());
            }
            if self.flags.vk_no_devices {
                hints.push(BAD_GPU_HINT.to_string());
            }
            if self.flags.trophy_key_hint {
                hints.push(TROPHY_KEY_HINT.to_string());
            }
            self.append_hints(hints);
        }

        self.doc
    }

    fn append_hints(&mut self, hints: Vec<String>) {
        self.doc["hints"] = Value::Array(hints.into_iter().map(Value::String).collect());
    }

    /// Renders the document to a pretty string with 2-space indentation.
    pub fn spit(doc: &Value) -> String {
        serde_json::to_string_pretty(doc).expect("Value serialization cannot fail")
    }
}

const INPUT_NOT_FOUND_HINT: &str = "One of your users has the input device set incorrectly, if you can't control the PS4 app, this could be the cause.";
const NVIDIA_HINT: &str = "You are using an NVIDIA graphics card, these cards have many issues on our emulator that may not be present on AMD cards.";
const BAD_GPU_HINT: &str = "Your GPU is not supported at the moment";
const TROPHY_KEY_HINT: &str = "You don't have the trophy key installed, this can cause problems in games, also you won't be able to see the list of trophies you have received. To solve this problem, check #faq channel in on Discord Server.";
