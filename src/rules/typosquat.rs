//! Typosquatted package names in install commands.

use crate::decision::Decision;
use crate::shell::{split_commands, tokenize, words};

static NPM_TYPOSQUATS: &[(&str, &str)] = &[
    ("lod-ash", "lodash"),
    ("lodahs", "lodash"),
    ("expres", "express"),
    ("expresss", "express"),
    ("requets", "request"),
    ("reqeust", "request"),
    ("electorn", "electron"),
    ("electronjs", "electron"),
    ("crossenv", "cross-env"),
    ("cross_env", "cross-env"),
    ("babelcli", "@babel/cli"),
    ("babel-cli", "@babel/cli"),
    ("coffe-script", "coffeescript"),
    ("event-stream2", "event-stream"),
    ("gruntcli", "grunt-cli"),
    ("mongose", "mongoose"),
    ("node-fabric", "fabric"),
    ("node-opencv", "opencv"),
    ("node-opensl", "openssl"),
    ("nodefabric", "fabric"),
    ("nodesass", "node-sass"),
    ("shadowsock", "shadowsocks"),
    ("smb", "samba"),
    ("discordi.js", "discord.js"),
    ("colored", "colors"),
    ("colors.js", "colors"),
];

static PIP_TYPOSQUATS: &[(&str, &str)] = &[
    ("reqeusts", "requests"),
    ("requets", "requests"),
    ("reequests", "requests"),
    ("djago", "django"),
    ("djnago", "django"),
    ("djangoo", "django"),
    ("flaask", "flask"),
    ("flaskk", "flask"),
    ("urlib3", "urllib3"),
    ("urrlib3", "urllib3"),
    ("numppy", "numpy"),
    ("nuumpy", "numpy"),
    ("pandass", "pandas"),
    ("scapy", "scipy"),
    ("beutifulsoup", "beautifulsoup4"),
    ("beautifulsoup", "beautifulsoup4"),
    ("dateutil", "python-dateutil"),
    ("colourama", "colorama"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ecosystem {
    Npm,
    Pip,
}

/// The real package a known typosquat imitates.
fn lookup(ecosystem: Ecosystem, name: &str) -> Option<&'static str> {
    let table = match ecosystem {
        Ecosystem::Npm => NPM_TYPOSQUATS,
        Ecosystem::Pip => PIP_TYPOSQUATS,
    };
    table.iter().find(|(bad, _)| *bad == name).map(|(_, real)| *real)
}

/// Drop a leading `sudo` and its flags.
fn skip_sudo<'a>(words: &'a [&'a str]) -> &'a [&'a str] {
    match words {
        ["sudo", rest @ ..] => {
            let start = rest.iter().position(|w| !w.starts_with('-')).unwrap_or(rest.len());
            &rest[start..]
        }
        _ => words,
    }
}

/// First package argument of an install segment, with its ecosystem.
fn installed_package(words: &[&str]) -> Option<(Ecosystem, String)> {
    let (ecosystem, rest) = match skip_sudo(words) {
        [tool, verb, rest @ ..]
            if matches!(*tool, "npm" | "yarn" | "pnpm")
                && matches!(*verb, "install" | "add" | "i") =>
        {
            (Ecosystem::Npm, rest)
        }
        [tool, "install", rest @ ..] if matches!(*tool, "pip" | "pip3") => (Ecosystem::Pip, rest),
        [python, "-m", "pip" | "pip3", "install", rest @ ..]
            if matches!(*python, "python" | "python3") =>
        {
            (Ecosystem::Pip, rest)
        }
        _ => return None,
    };
    rest.iter()
        .find(|w| !w.starts_with('-'))
        .map(|w| (ecosystem, w.to_string()))
}

/// Deny npm/yarn/pnpm/pip installs of known typosquats unless allow-listed.
pub fn check_typosquat(command: &str, allowed: &[String]) -> Decision {
    for segment in split_commands(command) {
        let tokens = tokenize(&segment.command);
        let Some((ecosystem, package)) = installed_package(&words(&tokens)) else {
            continue;
        };
        let lowered = package.to_lowercase();
        if allowed.iter().any(|a| a.to_lowercase() == lowered) {
            continue;
        }
        if let Some(real) = lookup(ecosystem, &lowered) {
            return Decision::deny(
                "dependency.typosquat",
                format!("Blocked: suspected typosquat package '{package}' (did you mean '{real}'?)"),
            );
        }
    }
    Decision::allow()
}
