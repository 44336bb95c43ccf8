//! Built-in module classification
//!
//! Decides whether an imported top-level module name belongs to the Python
//! standard distribution. The default classifier is a static allowlist, so no
//! module code is ever loaded. [`InterpreterClassifier`] can instead ask a real
//! interpreter which names are importable.

use std::collections::{BTreeSet, HashSet};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

use crate::analyzer::AnalyzerError;

/// Classifies module names as built-in or not
pub trait ModuleClassifier {
    fn is_builtin(&self, module: &str) -> bool;
}

/// Top-level names of the CPython 3.12 standard library (`sys.stdlib_module_names`)
pub const STDLIB_MODULES: &[&str] = &[
    "__future__", "__main__", "_abc", "_aix_support", "_ast", "_asyncio", "_bisect", "_blake2",
    "_bz2", "_codecs", "_codecs_cn", "_codecs_hk", "_codecs_iso2022", "_codecs_jp", "_codecs_kr",
    "_codecs_tw", "_collections", "_collections_abc", "_compat_pickle", "_compression",
    "_contextvars", "_crypt", "_csv", "_ctypes", "_curses", "_curses_panel", "_datetime",
    "_dbm", "_decimal", "_elementtree", "_frozen_importlib", "_frozen_importlib_external",
    "_functools", "_gdbm", "_hashlib", "_heapq", "_imp", "_io", "_json", "_locale", "_lsprof",
    "_lzma", "_markupbase", "_md5", "_msi", "_multibytecodec", "_multiprocessing", "_opcode",
    "_operator", "_osx_support", "_overlapped", "_pickle", "_posixshmem", "_posixsubprocess",
    "_py_abc", "_pydatetime", "_pydecimal", "_pyio", "_pylong", "_queue", "_random", "_scproxy",
    "_sha1", "_sha2", "_sha3", "_signal", "_sitebuiltins", "_socket", "_sqlite3", "_sre",
    "_ssl", "_stat", "_statistics", "_string", "_strptime", "_struct", "_symtable", "_thread",
    "_threading_local", "_tkinter", "_tokenize", "_tracemalloc", "_typing", "_uuid",
    "_warnings", "_weakref", "_weakrefset", "_winapi", "_wmi", "_zoneinfo", "abc", "aifc",
    "antigravity", "argparse", "array", "ast", "asyncio", "atexit", "audioop", "base64", "bdb",
    "binascii", "bisect", "builtins", "bz2", "cProfile", "calendar", "cgi", "cgitb", "chunk",
    "cmath", "cmd", "code", "codecs", "codeop", "collections", "colorsys", "compileall",
    "concurrent", "configparser", "contextlib", "contextvars", "copy", "copyreg", "crypt",
    "csv", "ctypes", "curses", "dataclasses", "datetime", "dbm", "decimal", "difflib", "dis",
    "doctest", "email", "encodings", "ensurepip", "enum", "errno", "faulthandler", "fcntl",
    "filecmp", "fileinput", "fnmatch", "fractions", "ftplib", "functools", "gc", "genericpath",
    "getopt", "getpass", "gettext", "glob", "graphlib", "grp", "gzip", "hashlib", "heapq",
    "hmac", "html", "http", "idlelib", "imaplib", "imghdr", "importlib", "inspect", "io",
    "ipaddress", "itertools", "json", "keyword", "lib2to3", "linecache", "locale", "logging",
    "lzma", "mailbox", "mailcap", "marshal", "math", "mimetypes", "mmap", "modulefinder",
    "msilib", "msvcrt", "multiprocessing", "netrc", "nis", "nntplib", "nt", "ntpath",
    "nturl2path", "numbers", "opcode", "operator", "optparse", "os", "ossaudiodev", "pathlib",
    "pdb", "pickle", "pickletools", "pipes", "pkgutil", "platform", "plistlib", "poplib",
    "posix", "posixpath", "pprint", "profile", "pstats", "pty", "pwd", "py_compile",
    "pyclbr", "pydoc", "pydoc_data", "pyexpat", "queue", "quopri", "random", "re", "readline",
    "reprlib", "resource", "rlcompleter", "runpy", "sched", "secrets", "select", "selectors",
    "shelve", "shlex", "shutil", "signal", "site", "smtplib", "sndhdr", "socket",
    "socketserver", "spwd", "sqlite3", "sre_compile", "sre_constants", "sre_parse", "ssl",
    "stat", "statistics", "string", "stringprep", "struct", "subprocess", "sunau", "symtable",
    "sys", "sysconfig", "syslog", "tabnanny", "tarfile", "telnetlib", "tempfile", "termios",
    "textwrap", "this", "threading", "time", "timeit", "tkinter", "token", "tokenize",
    "tomllib", "trace", "traceback", "tracemalloc", "tty", "turtle", "turtledemo", "types",
    "typing", "unicodedata", "unittest", "urllib", "uu", "uuid", "venv", "warnings", "wave",
    "weakref", "webbrowser", "winreg", "winsound", "wsgiref", "xdrlib", "xml", "xmlrpc",
    "zipapp", "zipfile", "zipimport", "zlib", "zoneinfo",
];

/// Set of module names considered built-in
#[derive(Debug, Clone)]
pub struct BuiltinModules {
    names: HashSet<String>,
}

impl BuiltinModules {
    /// The standard-library allowlist
    pub fn stdlib() -> Self {
        Self::from_names(STDLIB_MODULES.iter().copied())
    }

    /// A classifier that treats nothing as built-in
    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Add names that should also count as built-in
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(extra.into_iter().map(Into::into));
        self
    }

    /// Remove names that should never count as built-in
    pub fn without<I, S>(mut self, removed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in removed {
            self.names.remove(name.as_ref());
        }
        self
    }
}

impl Default for BuiltinModules {
    fn default() -> Self {
        Self::stdlib()
    }
}

impl ModuleClassifier for BuiltinModules {
    fn is_builtin(&self, module: &str) -> bool {
        self.names.contains(module)
    }
}

/// Reads module names from stdin, prints `1` or `0` per name
const FIND_SPEC_SCRIPT: &str = r#"
import importlib.util, sys
for line in sys.stdin:
    name = line.strip()
    try:
        found = importlib.util.find_spec(name) is not None
    except (ImportError, ValueError):
        found = False
    print("1" if found else "0", flush=True)
"#;

/// Classifies names by asking a Python interpreter whether they are importable.
///
/// `find_spec` locates a top-level module without executing it. Like any
/// importability check, third-party packages installed in that interpreter
/// are reported as built-in too.
pub struct InterpreterClassifier {
    python: String,
}

impl InterpreterClassifier {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Ask about every name once and return the importable ones
    pub fn classify(&self, names: &BTreeSet<String>) -> Result<BuiltinModules, AnalyzerError> {
        if names.is_empty() {
            return Ok(BuiltinModules::empty());
        }

        let mut child = Command::new(&self.python)
            .arg("-c")
            .arg(FIND_SPEC_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.error(format!("failed to start: {}", e)))?;

        // stdin is written from its own thread while stdout drains
        let input: String = names.iter().map(|n| format!("{}\n", n)).collect();
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = stdin.map(|mut stdin| scope.spawn(move || stdin.write_all(input.as_bytes())));
            let output = child.wait_with_output();
            let written = match writer.map(|handle| handle.join()) {
                None | Some(Ok(Ok(()))) => Ok(()),
                Some(Ok(Err(e))) => Err(e.to_string()),
                Some(Err(_)) => Err("stdin writer panicked".to_string()),
            };
            (written, output)
        });

        let output = output.map_err(|e| self.error(format!("did not finish: {}", e)))?;
        if !output.status.success() {
            return Err(self.error(format!(
                "exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        written.map_err(|e| self.error(format!("failed to write names: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let answers: Vec<&str> = stdout.lines().collect();
        if answers.len() != names.len() {
            return Err(self.error(format!(
                "expected {} answers, got {}",
                names.len(),
                answers.len()
            )));
        }

        let importable: Vec<&String> = names
            .iter()
            .zip(answers)
            .filter(|(_, answer)| answer.trim() == "1")
            .map(|(name, _)| name)
            .collect();
        debug!(
            asked = names.len(),
            importable = importable.len(),
            "interpreter classification finished"
        );

        Ok(BuiltinModules::from_names(importable.into_iter().cloned()))
    }

    fn error(&self, message: String) -> AnalyzerError {
        AnalyzerError::Interpreter(format!("{}: {}", self.python, message))
    }
}
