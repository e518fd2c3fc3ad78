//! Names that resolve without a declaration: ECMAScript built-ins plus the
//! common browser and Node.js globals.
//!
//! References to these never end up in a module's unresolved list.

/// Sorted so lookups can binary search.
static BUILTIN_GLOBALS: &[&str] = &[
    "AbortController",
    "AbortSignal",
    "AggregateError",
    "Array",
    "ArrayBuffer",
    "Atomics",
    "BigInt",
    "BigInt64Array",
    "BigUint64Array",
    "Blob",
    "Boolean",
    "Buffer",
    "CSS",
    "CSSStyleDeclaration",
    "CustomEvent",
    "DOMException",
    "DOMParser",
    "DataView",
    "Date",
    "Document",
    "Element",
    "Error",
    "EvalError",
    "Event",
    "EventTarget",
    "File",
    "FileReader",
    "FinalizationRegistry",
    "Float32Array",
    "Float64Array",
    "FormData",
    "Function",
    "HTMLCanvasElement",
    "HTMLDivElement",
    "HTMLElement",
    "HTMLInputElement",
    "Headers",
    "IDBDatabase",
    "Image",
    "Infinity",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "IntersectionObserver",
    "Intl",
    "JSON",
    "KeyboardEvent",
    "Map",
    "Math",
    "MessageChannel",
    "MouseEvent",
    "MutationObserver",
    "NaN",
    "Node",
    "NodeList",
    "Number",
    "Object",
    "Promise",
    "Proxy",
    "RangeError",
    "ReferenceError",
    "Reflect",
    "RegExp",
    "Request",
    "ResizeObserver",
    "Response",
    "Set",
    "SharedArrayBuffer",
    "String",
    "Symbol",
    "SyntaxError",
    "TextDecoder",
    "TextEncoder",
    "TypeError",
    "URIError",
    "URL",
    "URLSearchParams",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "WeakMap",
    "WeakRef",
    "WeakSet",
    "WebAssembly",
    "WebSocket",
    "Window",
    "Worker",
    "XMLHttpRequest",
    "XMLSerializer",
    "__dirname",
    "__filename",
    "alert",
    "arguments",
    "atob",
    "btoa",
    "cancelAnimationFrame",
    "clearImmediate",
    "clearInterval",
    "clearTimeout",
    "confirm",
    "console",
    "crypto",
    "customElements",
    "decodeURI",
    "decodeURIComponent",
    "document",
    "encodeURI",
    "encodeURIComponent",
    "escape",
    "eval",
    "exports",
    "fetch",
    "global",
    "globalThis",
    "history",
    "isFinite",
    "isNaN",
    "localStorage",
    "location",
    "module",
    "navigator",
    "parseFloat",
    "parseInt",
    "performance",
    "process",
    "queueMicrotask",
    "requestAnimationFrame",
    "require",
    "self",
    "sessionStorage",
    "setImmediate",
    "setInterval",
    "setTimeout",
    "structuredClone",
    "undefined",
    "unescape",
    "window",
];

pub fn is_builtin_global(name: &str) -> bool {
    BUILTIN_GLOBALS.binary_search(&name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_stays_sorted() {
        assert!(BUILTIN_GLOBALS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn recognizes_common_globals() {
        assert!(is_builtin_global("JSON"));
        assert!(is_builtin_global("XMLHttpRequest"));
        assert!(is_builtin_global("encodeURIComponent"));
        assert!(!is_builtin_global("aGLOBALVar"));
    }
}
